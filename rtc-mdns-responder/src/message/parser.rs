use std::time::Instant;

use super::header::{Header, HeaderInternal};
use super::question::Question;
use super::resource::Resource;
use shared::error::*;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Questions,
    Answers,
    Authorities,
    Additionals,
}

// A Parser reads one message section at a time. Sections must be consumed in
// wire order; each all_* method drains its section and arms the next one.
pub(crate) struct Parser<'a> {
    msg: &'a [u8],
    header: HeaderInternal,
    section: Section,
    off: usize,
    index: u16,
    received_at: Option<Instant>,
}

impl<'a> Parser<'a> {
    pub(crate) fn start(msg: &'a [u8], received_at: Option<Instant>) -> Result<Self> {
        let mut header = HeaderInternal::default();
        let off = header.unpack(msg, 0)?;
        Ok(Self {
            msg,
            header,
            section: Section::Questions,
            off,
            index: 0,
            received_at,
        })
    }

    pub(crate) fn header(&self) -> Header {
        self.header.header()
    }

    fn section_count(&self, section: Section) -> u16 {
        match section {
            Section::Questions => self.header.questions,
            Section::Answers => self.header.answers,
            Section::Authorities => self.header.authorities,
            Section::Additionals => self.header.additionals,
        }
    }

    fn enter(&mut self, section: Section) -> Result<()> {
        if self.section > section {
            return Err(Error::ErrSectionDone);
        }
        while self.section < section {
            // Drain anything left of the earlier section.
            while self.index < self.section_count(self.section) {
                self.skip_one()?;
            }
            self.section = next_section(self.section);
            self.index = 0;
        }
        Ok(())
    }

    fn skip_one(&mut self) -> Result<()> {
        self.off = match self.section {
            Section::Questions => {
                let (_, off) = Question::unpack(self.msg, self.off)?;
                off
            }
            _ => skip_resource(self.msg, self.off)?,
        };
        self.index += 1;
        Ok(())
    }

    pub(crate) fn question(&mut self) -> Result<Question> {
        self.enter(Section::Questions)?;
        if self.index >= self.header.questions {
            return Err(Error::ErrSectionDone);
        }
        let (q, off) = Question::unpack(self.msg, self.off)?;
        self.off = off;
        self.index += 1;
        Ok(q)
    }

    pub(crate) fn all_questions(&mut self) -> Result<Vec<Question>> {
        self.enter(Section::Questions)?;
        let mut questions = Vec::with_capacity(self.header.questions as usize);
        loop {
            match self.question() {
                Ok(q) => questions.push(q),
                Err(Error::ErrSectionDone) => return Ok(questions),
                Err(err) => return Err(err),
            }
        }
    }

    // Records of unmodeled types are skipped rather than surfaced.
    fn resources(&mut self, section: Section) -> Result<Vec<Resource>> {
        self.enter(section)?;
        let count = self.section_count(section);
        let mut resources = Vec::with_capacity(count as usize);
        while self.index < count {
            let (resource, off) = Resource::unpack(self.msg, self.off, self.received_at)?;
            self.off = off;
            self.index += 1;
            if let Some(resource) = resource {
                resources.push(resource);
            }
        }
        Ok(resources)
    }

    pub(crate) fn all_answers(&mut self) -> Result<Vec<Resource>> {
        self.resources(Section::Answers)
    }

    pub(crate) fn all_authorities(&mut self) -> Result<Vec<Resource>> {
        self.resources(Section::Authorities)
    }

    pub(crate) fn all_additionals(&mut self) -> Result<Vec<Resource>> {
        self.resources(Section::Additionals)
    }
}

fn next_section(section: Section) -> Section {
    match section {
        Section::Questions => Section::Answers,
        Section::Answers => Section::Authorities,
        Section::Authorities => Section::Additionals,
        Section::Additionals => Section::Additionals,
    }
}

// skip_resource advances past one record without decoding its body.
fn skip_resource(msg: &[u8], off: usize) -> Result<usize> {
    use super::DnsType;
    use super::name::Name;
    use super::packer::{skip_uint16, skip_uint32, unpack_uint16};

    let off = Name::skip(msg, off)?;
    let off = DnsType::skip(msg, off)?;
    let off = skip_uint16(msg, off)?; // class
    let off = skip_uint32(msg, off)?; // ttl
    let (length, off) = unpack_uint16(msg, off)?;
    let end = off + length as usize;
    if end > msg.len() {
        return Err(Error::ErrResourceLen);
    }
    Ok(end)
}
