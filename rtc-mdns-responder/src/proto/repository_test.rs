use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use super::registration::{ServiceInfo, ServiceState};
use super::repository::{ConflictKind, RecordRepository};
use super::{MDNS_DEST_ADDR_IPV4, MDNS_DEST_ADDR_IPV6};
use crate::config::ResponderConfig;
use crate::message::header::Header;
use crate::message::name::Name;
use crate::message::question::Question;
use crate::message::resource::aaaa::AaaaResource;
use crate::message::resource::ptr::PtrResource;
use crate::message::resource::srv::SrvResource;
use crate::message::resource::txt::TxtResource;
use crate::message::resource::{RData, Resource};
use crate::message::{DnsType, Message};
use shared::error::Error;

const HOST_SUFFIX: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

fn name(s: &str) -> Name {
    s.parse().unwrap()
}

fn test_addresses() -> Vec<IpAddr> {
    vec![
        "192.0.2.111".parse().unwrap(),
        "2001:db8::111".parse().unwrap(),
        "2001:db8::222".parse().unwrap(),
    ]
}

fn test_config() -> ResponderConfig {
    ResponderConfig::default()
        .with_host_suffix(HOST_SUFFIX)
        .with_addresses(test_addresses())
}

fn test_repository() -> RecordRepository {
    RecordRepository::new(test_config()).unwrap()
}

fn host_name() -> Name {
    name("Android_000102030405060708090A0B0C0D0E0F.local")
}

fn test_service() -> ServiceInfo {
    ServiceInfo::new("MyTestService", "_testservice._tcp", 12345)
}

// Registers a service and fast-forwards it to Active so it answers queries.
fn add_active(repo: &mut RecordRepository, id: i32, info: ServiceInfo) {
    assert_eq!(repo.add_service(id, &info).unwrap(), -1);
    let reg = repo.get_mut(id).unwrap();
    reg.state = ServiceState::Active;
    reg.advertised = true;
}

fn ptr_query(name_str: &str) -> Message {
    Message {
        header: Header::default(),
        questions: vec![Question::new(name(name_str), DnsType::Ptr)],
        ..Default::default()
    }
}

fn src_v4() -> SocketAddr {
    "192.0.2.123:5353".parse().unwrap()
}

#[test]
fn test_add_service_conflict_returns_existing_id() {
    let mut repo = test_repository();
    assert_eq!(repo.add_service(1, &test_service()).unwrap(), -1);
    // Same name modulo DNS case: not an error, the existing id comes back.
    let colliding = ServiceInfo::new("MyTESTSERVICE", "_TESTSERVICE._tcp", 9999);
    assert_eq!(repo.add_service(3, &colliding).unwrap(), 1);
    assert_eq!(repo.services_count(), 1);
}

#[test]
fn test_name_collision_wins_over_id_reuse() {
    let mut repo = test_repository();
    repo.add_service(1, &ServiceInfo::new("SvcOne", "_one._tcp", 1))
        .unwrap();
    repo.add_service(2, &test_service()).unwrap();
    // Reusing a mapped id with a name that collides with another
    // registration reports the collision, not the id reuse.
    let colliding = ServiceInfo::new("mytestservice", "_TESTSERVICE._tcp", 7);
    assert_eq!(repo.add_service(1, &colliding).unwrap(), 2);
    assert_eq!(repo.services_count(), 2);
}

#[test]
fn test_add_service_id_reuse_fails() {
    let mut repo = test_repository();
    repo.add_service(1, &test_service()).unwrap();
    let other = ServiceInfo::new("Other", "_other._tcp", 1);
    assert_eq!(
        repo.add_service(1, &other).unwrap_err(),
        Error::ErrAlreadyActive(1)
    );
    // A removed id is retired for good.
    repo.remove_service(1).unwrap();
    assert!(matches!(
        repo.add_service(1, &other).unwrap_err(),
        Error::ErrBadParameters(_)
    ));
}

#[test]
fn test_add_service_validates_type() {
    let mut repo = test_repository();
    for bad in ["testservice._tcp", "_testservice._quic", "_x._tcp.local"] {
        let info = ServiceInfo::new("Svc", bad, 1);
        assert!(
            matches!(repo.add_service(9, &info), Err(Error::ErrBadParameters(_))),
            "expected type {bad:?} to be rejected"
        );
    }
}

#[test]
fn test_ttl_override_bounds() {
    let mut repo = test_repository();
    let short = test_service().with_ttl(Duration::from_secs(29));
    assert!(matches!(
        repo.add_service(1, &short),
        Err(Error::ErrBadParameters(_))
    ));
    let long = test_service().with_ttl(Duration::from_secs(36_001));
    assert!(matches!(
        repo.add_service(1, &long),
        Err(Error::ErrBadParameters(_))
    ));
    // Privileged callers may exceed the range.
    let privileged = test_service()
        .with_ttl(Duration::from_secs(5))
        .privileged();
    assert_eq!(repo.add_service(1, &privileged).unwrap(), -1);
    // In-range values are fine unprivileged.
    let ok = ServiceInfo::new("Another", "_other._tcp", 2).with_ttl(Duration::from_secs(30));
    assert_eq!(repo.add_service(2, &ok).unwrap(), -1);
}

#[test]
fn test_custom_host_address_sets_must_match() {
    let mut repo = test_repository();
    let a = ServiceInfo::new("SvcA", "_a._tcp", 1).with_custom_host(
        "TestHost",
        vec!["2001:db8::1".parse().unwrap(), "2001:db8::2".parse().unwrap()],
    );
    assert_eq!(repo.add_service(1, &a).unwrap(), -1);

    // Same host, same set in a different order: accepted.
    let b = ServiceInfo::new("SvcB", "_b._tcp", 2).with_custom_host(
        "TestHost",
        vec!["2001:db8::2".parse().unwrap(), "2001:db8::1".parse().unwrap()],
    );
    assert_eq!(repo.add_service(2, &b).unwrap(), -1);

    // Same host, different set: conflict.
    let c = ServiceInfo::new("SvcC", "_c._tcp", 3)
        .with_custom_host("TestHost", vec!["2001:db8::3".parse().unwrap()]);
    assert!(matches!(
        repo.add_service(3, &c),
        Err(Error::ErrBadParameters(_))
    ));
}

#[test]
fn test_probing_packet_shape() {
    let mut repo = test_repository();
    repo.add_service(42, &test_service()).unwrap();
    let probe = repo.probing_packet(42).unwrap();
    assert_eq!(probe.header.flags(), 0);
    assert_eq!(probe.questions.len(), 1);
    assert_eq!(probe.questions[0].typ, DnsType::Any);
    assert_eq!(
        probe.questions[0].name,
        name("MyTestService._testservice._tcp.local")
    );
    assert_eq!(probe.authorities.len(), 1);
    assert_eq!(probe.authorities[0].typ(), DnsType::Srv);
    assert!(probe.answers.is_empty());
    assert!(probe.additionals.is_empty());
}

#[test]
fn test_probing_packet_with_host_records() {
    let config = test_config().with_host_records_in_probing(true);
    let mut repo = RecordRepository::new(config).unwrap();
    repo.add_service(42, &test_service()).unwrap();
    let probe = repo.probing_packet(42).unwrap();
    assert_eq!(probe.questions.len(), 2);
    assert_eq!(probe.questions[1].name, host_name());
    // SRV plus one record per address
    assert_eq!(probe.authorities.len(), 4);
}

#[test]
fn test_announcement_ptr_counts() {
    // No addresses so the only PTRs are service ones: base + enumeration +
    // one per subtype.
    let config = ResponderConfig::default().with_host_suffix(HOST_SUFFIX);
    let mut repo = RecordRepository::new(config).unwrap();
    let info = test_service().with_subtypes(vec!["_s1".to_owned(), "_s2".to_owned()]);
    repo.add_service(42, &info).unwrap();
    let announcement = repo.announcement_packet(42).unwrap();
    let ptrs: Vec<&Resource> = announcement
        .answers
        .iter()
        .filter(|r| r.typ() == DnsType::Ptr)
        .collect();
    assert_eq!(ptrs.len(), 4);
    assert_eq!(
        announcement
            .answers
            .iter()
            .filter(|r| r.header.name == name("_services._dns-sd._udp.local"))
            .count(),
        1
    );
    for subtype in ["_s1", "_s2"] {
        let subtype_name = format!("{subtype}._sub._testservice._tcp.local");
        assert_eq!(
            announcement
                .answers
                .iter()
                .filter(|r| r.header.name == name(&subtype_name))
                .count(),
            1,
            "expected exactly one PTR for {subtype}"
        );
    }
}

#[test]
fn test_announcement_records_and_proofs() {
    let mut repo = test_repository();
    repo.add_service(42, &test_service()).unwrap();
    let announcement = repo.announcement_packet(42).unwrap();
    assert_eq!(announcement.header.flags(), 0x8400);
    assert_eq!(announcement.header.id, 0);
    assert!(announcement.questions.is_empty());
    assert!(announcement.authorities.is_empty());

    // 3 reverse PTRs + 3 addresses + service PTR + SRV + TXT + enumeration
    assert_eq!(announcement.answers.len(), 10);

    // Address and reverse records carry cache-flush and the short TTL.
    let reverse = announcement
        .answers
        .iter()
        .find(|r| r.header.name == name("111.2.0.192.in-addr.arpa"))
        .expect("reverse PTR for the IPv4 address");
    assert!(reverse.header.cache_flush);
    assert_eq!(reverse.header.ttl, Duration::from_secs(120));
    match &reverse.rdata {
        RData::Ptr(p) => assert_eq!(p.ptr, host_name()),
        other => panic!("expected PTR, got {other:?}"),
    }

    // The service PTR is shared, no cache-flush, long TTL.
    let service_ptr = announcement
        .answers
        .iter()
        .find(|r| r.header.name == name("_testservice._tcp.local"))
        .unwrap();
    assert!(!service_ptr.header.cache_flush);
    assert_eq!(service_ptr.header.ttl, Duration::from_secs(4500));

    // Negative proofs: one per reverse name, one for the host, one for the
    // instance.
    assert_eq!(announcement.additionals.len(), 5);
    let host_nsec = announcement
        .additionals
        .iter()
        .find(|r| r.header.name == host_name())
        .unwrap();
    match &host_nsec.rdata {
        RData::Nsec(nsec) => {
            assert_eq!(nsec.next_domain, host_name());
            assert!(nsec.contains(DnsType::A));
            assert!(nsec.contains(DnsType::Aaaa));
        }
        other => panic!("expected NSEC, got {other:?}"),
    }
    let instance_nsec = announcement
        .additionals
        .iter()
        .find(|r| r.header.name == name("MyTestService._testservice._tcp.local"))
        .unwrap();
    assert_eq!(instance_nsec.header.ttl, Duration::from_secs(4500));
    match &instance_nsec.rdata {
        RData::Nsec(nsec) => {
            assert!(nsec.contains(DnsType::Txt));
            assert!(nsec.contains(DnsType::Srv));
            assert!(!nsec.contains(DnsType::A));
        }
        other => panic!("expected NSEC, got {other:?}"),
    }
}

#[test]
fn test_reply_to_ptr_query() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());

    let reply = repo
        .reply(&ptr_query("_testservice._tcp.local"), src_v4(), Instant::now())
        .expect("query should be answered");
    assert_eq!(reply.destination, MDNS_DEST_ADDR_IPV4);

    assert_eq!(reply.answers.len(), 1);
    let answer = &reply.answers[0];
    assert_eq!(answer.typ(), DnsType::Ptr);
    assert_eq!(answer.header.ttl, Duration::from_secs(4500));
    match &answer.rdata {
        RData::Ptr(p) => assert_eq!(p.ptr, name("MyTestService._testservice._tcp.local")),
        other => panic!("expected PTR, got {other:?}"),
    }

    // SRV + TXT + three addresses + two NSEC proofs
    assert_eq!(reply.additional_answers.len(), 7);
    let srv = reply
        .additional_answers
        .iter()
        .find(|r| r.typ() == DnsType::Srv)
        .unwrap();
    match &srv.rdata {
        RData::Srv(srv) => {
            assert_eq!(srv.port, 12345);
            assert_eq!(srv.target, host_name());
        }
        other => panic!("expected SRV, got {other:?}"),
    }
    assert_eq!(
        reply
            .additional_answers
            .iter()
            .filter(|r| matches!(r.typ(), DnsType::A | DnsType::Aaaa))
            .count(),
        3
    );
    assert_eq!(
        reply
            .additional_answers
            .iter()
            .filter(|r| r.typ() == DnsType::Nsec)
            .count(),
        2
    );
    assert!(reply.known_answers.is_empty());

    // Nothing appears twice across answers and additionals.
    let mut all: Vec<&Resource> = reply.answers.iter().collect();
    all.extend(reply.additional_answers.iter());
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert!(!a.same_data(b), "duplicate record {a}");
        }
    }
}

#[test]
fn test_reply_is_case_insensitive() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());

    let upper = repo
        .reply(&ptr_query("_TESTSERVICE._TCP.local"), src_v4(), Instant::now())
        .expect("uppercase query should be answered");
    assert_eq!(upper.answers.len(), 1);
    assert_eq!(upper.additional_answers.len(), 7);
}

#[test]
fn test_reply_to_subtype_query() {
    let mut repo = test_repository();
    add_active(
        &mut repo,
        42,
        test_service().with_subtypes(vec!["_subtype".to_owned()]),
    );

    let reply = repo
        .reply(
            &ptr_query("_subtype._sub._testservice._tcp.local"),
            src_v4(),
            Instant::now(),
        )
        .expect("subtype query should be answered");
    assert_eq!(reply.answers.len(), 1);
    assert_eq!(
        reply.answers[0].header.name,
        name("_subtype._sub._testservice._tcp.local")
    );
    match &reply.answers[0].rdata {
        RData::Ptr(p) => assert_eq!(p.ptr, name("MyTestService._testservice._tcp.local")),
        other => panic!("expected PTR, got {other:?}"),
    }
    // Same additionals as a plain type query.
    assert_eq!(reply.additional_answers.len(), 7);

    // A subtype nobody registered is not answered.
    assert!(
        repo.reply(
            &ptr_query("_other._sub._testservice._tcp.local"),
            src_v4(),
            Instant::now()
        )
        .is_none()
    );
}

#[test]
fn test_reply_to_enumeration_query() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());
    let reply = repo
        .reply(
            &ptr_query("_services._dns-sd._udp.local"),
            src_v4(),
            Instant::now(),
        )
        .expect("enumeration query should be answered");
    assert_eq!(reply.answers.len(), 1);
    match &reply.answers[0].rdata {
        RData::Ptr(p) => assert_eq!(p.ptr, name("_testservice._tcp.local")),
        other => panic!("expected PTR, got {other:?}"),
    }
}

#[test]
fn test_probing_services_do_not_answer() {
    let mut repo = test_repository();
    repo.add_service(42, &test_service()).unwrap();
    assert!(repo.is_probing(42));
    assert!(
        repo.reply(&ptr_query("_testservice._tcp.local"), src_v4(), Instant::now())
            .is_none()
    );
}

#[test]
fn test_known_answer_suppression() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());

    let fresh_known = Resource::new(
        name("_testservice._tcp.local"),
        false,
        Duration::from_millis(4_499_000),
        RData::Ptr(PtrResource {
            ptr: name("MyTestService._testservice._tcp.local"),
        }),
    );
    let mut query = ptr_query("_testservice._tcp.local");
    query.answers = vec![fresh_known];
    // More than half the TTL left: fully suppressed.
    assert!(repo.reply(&query, src_v4(), Instant::now()).is_none());

    // Less than half left: answered, and the stale known answer is echoed.
    let stale_known = Resource::new(
        name("_testservice._tcp.local"),
        false,
        Duration::from_secs(2000),
        RData::Ptr(PtrResource {
            ptr: name("MyTestService._testservice._tcp.local"),
        }),
    );
    let mut query = ptr_query("_testservice._tcp.local");
    query.answers = vec![stale_known.clone()];
    let reply = repo.reply(&query, src_v4(), Instant::now()).unwrap();
    assert_eq!(reply.answers.len(), 1);
    assert_eq!(reply.known_answers.len(), 1);
    assert!(reply.known_answers[0].same_data(&stale_known));
}

#[test]
fn test_known_answer_suppression_disabled() {
    let config = test_config().with_known_answer_suppression(false);
    let mut repo = RecordRepository::new(config).unwrap();
    add_active(&mut repo, 42, test_service());

    let mut query = ptr_query("_testservice._tcp.local");
    query.answers = vec![Resource::new(
        name("_testservice._tcp.local"),
        false,
        Duration::from_millis(4_499_000),
        RData::Ptr(PtrResource {
            ptr: name("MyTestService._testservice._tcp.local"),
        }),
    )];
    let reply = repo.reply(&query, src_v4(), Instant::now()).unwrap();
    assert_eq!(reply.answers.len(), 1);
    assert!(reply.known_answers.is_empty());
}

#[test]
fn test_known_answer_continuation_has_no_reply() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());
    let mut continuation = ptr_query("_testservice._tcp.local");
    continuation.questions.clear();
    continuation.header.truncated = true;
    continuation.answers = vec![Resource::new(
        name("_testservice._tcp.local"),
        false,
        Duration::from_secs(4500),
        RData::Ptr(PtrResource {
            ptr: name("MyTestService._testservice._tcp.local"),
        }),
    )];
    assert!(repo.reply(&continuation, src_v4(), Instant::now()).is_none());
}

#[test]
fn test_unicast_reply_selection() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());

    // Every matched question requests unicast: reply goes to the source.
    let mut query = ptr_query("_testservice._tcp.local");
    query.questions[0].unicast_response = true;
    let reply = repo.reply(&query, src_v4(), Instant::now()).unwrap();
    assert_eq!(reply.destination, src_v4());

    // Mixed unicast and multicast questions: multicast wins.
    let mut unicast_q = Question::new(
        name("MyTestService._testservice._tcp.local"),
        DnsType::Srv,
    );
    unicast_q.unicast_response = true;
    let mut mixed = ptr_query("_testservice._tcp.local");
    mixed.questions.push(unicast_q);
    let reply = repo.reply(&mixed, src_v4(), Instant::now()).unwrap();
    assert_eq!(reply.destination, MDNS_DEST_ADDR_IPV4);

    // IPv6 source selects the IPv6 group.
    let src6: SocketAddr = "[2001:db8::9]:5353".parse().unwrap();
    let reply = repo
        .reply(&ptr_query("_testservice._tcp.local"), src6, Instant::now())
        .unwrap();
    assert_eq!(reply.destination, MDNS_DEST_ADDR_IPV6);
}

#[test]
fn test_unicast_reply_feature_disabled() {
    let config = test_config().with_unicast_reply(false);
    let mut repo = RecordRepository::new(config).unwrap();
    add_active(&mut repo, 42, test_service());
    let mut query = ptr_query("_testservice._tcp.local");
    query.questions[0].unicast_response = true;
    let reply = repo.reply(&query, src_v4(), Instant::now()).unwrap();
    assert_eq!(reply.destination, MDNS_DEST_ADDR_IPV4);
}

#[test]
fn test_exit_packet() {
    let mut repo = test_repository();
    add_active(
        &mut repo,
        42,
        test_service().with_subtypes(vec!["_s1".to_owned()]),
    );
    let exit = repo.exit_packet(42).unwrap();
    assert_eq!(exit.header.flags(), 0x8400);
    assert!(exit.questions.is_empty());
    assert!(exit.authorities.is_empty());
    assert!(exit.additionals.is_empty());
    assert_eq!(exit.answers.len(), 2);
    for answer in &exit.answers {
        assert_eq!(answer.typ(), DnsType::Ptr);
        assert_eq!(answer.header.ttl, Duration::ZERO);
        assert!(!answer.header.cache_flush);
    }
}

#[test]
fn test_offload_packet() {
    let mut repo = test_repository();
    add_active(
        &mut repo,
        42,
        test_service().with_subtypes(vec!["_s1".to_owned()]),
    );
    let offload = repo.offload_packet(42).unwrap();
    assert_eq!(offload.header.flags(), 0x8400);
    assert_eq!(offload.header.id, 0);
    // type PTR, SRV, TXT, three addresses; no subtype or enumeration PTRs,
    // no NSEC.
    assert_eq!(offload.answers.len(), 6);
    assert_eq!(offload.answers[0].typ(), DnsType::Ptr);
    assert_eq!(offload.answers[1].typ(), DnsType::Srv);
    assert_eq!(offload.answers[2].typ(), DnsType::Txt);
    assert!(offload.additionals.is_empty());
    assert!(
        !offload
            .answers
            .iter()
            .any(|r| r.header.name == name("_services._dns-sd._udp.local"))
    );
}

#[test]
fn test_conflicts_identical_records_are_not_conflicts() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());
    let ours = Message {
        header: Header::response(),
        answers: vec![
            Resource::new(
                name("MyTestService._testservice._tcp.local"),
                true,
                Duration::from_secs(120),
                RData::Srv(SrvResource {
                    priority: 0,
                    weight: 0,
                    port: 12345,
                    target: host_name(),
                }),
            ),
            Resource::new(
                name("MyTestService._testservice._tcp.local"),
                true,
                Duration::from_secs(4500),
                RData::Txt(TxtResource { entries: vec![] }),
            ),
        ],
        ..Default::default()
    };
    assert!(repo.conflicting_services(&ours).is_empty());
}

#[test]
fn test_conflicts_differing_srv_is_service_conflict() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());
    let theirs = Message {
        header: Header::response(),
        answers: vec![Resource::new(
            name("mytestservice._testservice._tcp.local"),
            true,
            Duration::from_secs(120),
            RData::Srv(SrvResource {
                priority: 0,
                weight: 0,
                port: 80, // different port
                target: host_name(),
            }),
        )],
        ..Default::default()
    };
    let conflicts = repo.conflicting_services(&theirs);
    assert_eq!(conflicts.get(&42), Some(&ConflictKind::Service));
}

#[test]
fn test_conflicts_same_rdata_different_ttl_is_service_conflict() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());
    let theirs = Message {
        header: Header::response(),
        answers: vec![Resource::new(
            name("MyTestService._testservice._tcp.local"),
            true,
            Duration::from_secs(99),
            RData::Srv(SrvResource {
                priority: 0,
                weight: 0,
                port: 12345,
                target: host_name(),
            }),
        )],
        ..Default::default()
    };
    let conflicts = repo.conflicting_services(&theirs);
    assert_eq!(conflicts.get(&42), Some(&ConflictKind::Service));
}

fn aaaa(host: &str, addr: &str) -> Resource {
    Resource::new(
        name(host),
        true,
        Duration::from_secs(120),
        RData::Aaaa(AaaaResource {
            aaaa: addr.parse().unwrap(),
        }),
    )
}

#[test]
fn test_host_conflict_superset_flags_owner() {
    let mut repo = test_repository();
    let info = ServiceInfo::new("HostedSvc", "_x._tcp", 1).with_custom_host(
        "TestHost",
        vec!["2001:db8::1".parse().unwrap(), "2001:db8::2".parse().unwrap()],
    );
    add_active(&mut repo, 45, info);

    let theirs = Message {
        header: Header::response(),
        answers: vec![
            aaaa("TestHost.local", "2001:db8::5"),
            aaaa("TestHost.local", "2001:db8::6"),
        ],
        ..Default::default()
    };
    let conflicts = repo.conflicting_services(&theirs);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts.get(&45), Some(&ConflictKind::Host));
}

#[test]
fn test_host_conflict_subset_is_fine() {
    let mut repo = test_repository();
    let info = ServiceInfo::new("HostedSvc", "_x._tcp", 1).with_custom_host(
        "TestHost",
        vec!["2001:db8::1".parse().unwrap(), "2001:db8::2".parse().unwrap()],
    );
    add_active(&mut repo, 45, info);

    let theirs = Message {
        header: Header::response(),
        answers: vec![aaaa("testhost.local", "2001:db8::2")],
        ..Default::default()
    };
    assert!(repo.conflicting_services(&theirs).is_empty());
}

#[test]
fn test_update_service_replaces_subtypes() {
    let mut repo = test_repository();
    add_active(&mut repo, 42, test_service());
    assert_eq!(
        repo.update_service(7, vec!["_s1".to_owned()]).unwrap_err(),
        Error::ErrNoTransaction(7)
    );
    repo.update_service(42, vec!["_new".to_owned()]).unwrap();
    let announcement = repo.announcement_packet(42).unwrap();
    assert!(
        announcement
            .answers
            .iter()
            .any(|r| r.header.name == name("_new._sub._testservice._tcp.local"))
    );
}

#[test]
fn test_clear_services() {
    let mut repo = test_repository();
    repo.add_service(1, &test_service()).unwrap();
    repo.add_service(2, &ServiceInfo::new("Other", "_other._udp", 2))
        .unwrap();
    let mut cleared = repo.clear_services();
    cleared.sort_unstable();
    assert_eq!(cleared, vec![1, 2]);
    assert_eq!(repo.services_count(), 0);
}
