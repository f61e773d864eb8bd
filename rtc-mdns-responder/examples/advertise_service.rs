//! Advertises a demo service on the local network until interrupted.
//!
//! Usage:
//!   cargo run --example advertise_service -- <local-ip> [instance-name]

use std::net::IpAddr;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use sansio::Protocol;
use shared::{TaggedBytesMut, TransportContext, TransportProtocol};

use rtc_mdns_responder::{
    MulticastSocket, Responder, ResponderConfig, ResponderEvent, ServiceInfo, TxtEntry,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let local_ip: IpAddr = args
        .next()
        .ok_or("usage: advertise_service <local-ip> [instance-name]")?
        .parse()?;
    let instance = args.next().unwrap_or_else(|| "Demo Service".to_owned());

    let socket = MulticastSocket::new().into_std()?;
    socket.set_nonblocking(false)?;
    socket.set_read_timeout(Some(Duration::from_millis(100)))?;
    let local_addr = socket.local_addr()?;

    let config = ResponderConfig::default().with_addresses(vec![local_ip]);
    let mut responder = Responder::new(config)?;
    println!("advertising {instance} at {}", responder.host_name());

    responder.add_service(
        1,
        ServiceInfo::new(instance, "_demo._tcp", 8080)
            .with_txt(vec![TxtEntry::new("path", "/")]),
    )?;

    let mut buf = vec![0u8; 1500];
    loop {
        while let Some(packet) = responder.poll_write() {
            socket.send_to(&packet.message, packet.transport.peer_addr)?;
        }

        if let Ok((len, src)) = socket.recv_from(&mut buf) {
            let msg = TaggedBytesMut {
                now: Instant::now(),
                transport: TransportContext {
                    local_addr,
                    peer_addr: src,
                    transport_protocol: TransportProtocol::UDP,
                },
                message: BytesMut::from(&buf[..len]),
            };
            responder.handle_read(msg)?;
        }

        if let Some(deadline) = responder.poll_timeout()
            && deadline <= Instant::now()
        {
            responder.handle_timeout(Instant::now())?;
        }

        while let Some(event) = responder.poll_event() {
            match event {
                ResponderEvent::ProbingSucceeded(id) => println!("service {id} won its name"),
                ResponderEvent::ServiceRegistered(id) => println!("service {id} is active"),
                ResponderEvent::NameConflict { id, kind } => {
                    println!("service {id} conflicts: {kind:?}")
                }
                ResponderEvent::Inactive => return Ok(()),
            }
        }
    }
}
