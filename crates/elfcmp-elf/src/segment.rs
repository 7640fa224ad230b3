//! ELF program header (segment) parsing.

use elfcmp_types::{FieldValue, Record};

use crate::error::ParseResult;
use crate::header::ElfClass;
use crate::reader::{Endianness, Reader};

pub const PT_LOAD: u32 = 1;

/// A parsed program header (segment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramHeader {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl ProgramHeader {
    /// Size of one table entry for the given class.
    pub fn entry_size(class: ElfClass) -> usize {
        match class {
            ElfClass::Elf32 => 32,
            ElfClass::Elf64 => 56,
        }
    }

    /// Parse a program header from the start of `data`.
    pub fn parse(data: &[u8], class: ElfClass, endianness: Endianness) -> ParseResult<Self> {
        let r = Reader::new(data, endianness, "program header");
        r.require(Self::entry_size(class))?;

        // The flags word moves between the two layouts.
        Ok(match class {
            ElfClass::Elf32 => Self {
                p_type: r.u32(0)?,
                p_offset: r.u32(4)?.into(),
                p_vaddr: r.u32(8)?.into(),
                p_paddr: r.u32(12)?.into(),
                p_filesz: r.u32(16)?.into(),
                p_memsz: r.u32(20)?.into(),
                p_flags: r.u32(24)?,
                p_align: r.u32(28)?.into(),
            },
            ElfClass::Elf64 => Self {
                p_type: r.u32(0)?,
                p_flags: r.u32(4)?,
                p_offset: r.u64(8)?,
                p_vaddr: r.u64(16)?,
                p_paddr: r.u64(24)?,
                p_filesz: r.u64(32)?,
                p_memsz: r.u64(40)?,
                p_align: r.u64(48)?,
            },
        })
    }

    /// Symbolic segment type, e.g. `PT_LOAD`.
    pub fn kind(&self) -> String {
        match type_name(self.p_type) {
            Some(name) => name.to_string(),
            None => format!("PT_{:#x}", self.p_type),
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("p_type".into(), FieldValue::Enum(self.kind()));
        record.insert("p_flags".into(), self.p_flags.into());
        record.insert("p_offset".into(), self.p_offset.into());
        record.insert("p_vaddr".into(), self.p_vaddr.into());
        record.insert("p_paddr".into(), self.p_paddr.into());
        record.insert("p_filesz".into(), self.p_filesz.into());
        record.insert("p_memsz".into(), self.p_memsz.into());
        record.insert("p_align".into(), self.p_align.into());
        record
    }
}

fn type_name(value: u32) -> Option<&'static str> {
    Some(match value {
        0 => "PT_NULL",
        PT_LOAD => "PT_LOAD",
        2 => "PT_DYNAMIC",
        3 => "PT_INTERP",
        4 => "PT_NOTE",
        5 => "PT_SHLIB",
        6 => "PT_PHDR",
        7 => "PT_TLS",
        0x6474_e550 => "PT_GNU_EH_FRAME",
        0x6474_e551 => "PT_GNU_STACK",
        0x6474_e552 => "PT_GNU_RELRO",
        0x6474_e553 => "PT_GNU_PROPERTY",
        0x7000_0001 => "PT_ARM_EXIDX",
        0x7000_0003 => "PT_RISCV_ATTRIBUTES",
        _ => return None,
    })
}
