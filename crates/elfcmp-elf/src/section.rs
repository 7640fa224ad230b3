//! ELF section header parsing.

use elfcmp_types::{FieldValue, Record};

use crate::error::ParseResult;
use crate::header::ElfClass;
use crate::reader::{Endianness, Reader};

pub const SHT_NULL: u32 = 0;
pub const SHT_NOBITS: u32 = 8;

/// A parsed section header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl SectionHeader {
    /// Size of one table entry for the given class.
    pub fn entry_size(class: ElfClass) -> usize {
        match class {
            ElfClass::Elf32 => 40,
            ElfClass::Elf64 => 64,
        }
    }

    /// Parse a section header from the start of `data`.
    pub fn parse(data: &[u8], class: ElfClass, endianness: Endianness) -> ParseResult<Self> {
        let r = Reader::new(data, endianness, "section header");
        r.require(Self::entry_size(class))?;

        Ok(match class {
            ElfClass::Elf32 => Self {
                sh_name: r.u32(0)?,
                sh_type: r.u32(4)?,
                sh_flags: r.u32(8)?.into(),
                sh_addr: r.u32(12)?.into(),
                sh_offset: r.u32(16)?.into(),
                sh_size: r.u32(20)?.into(),
                sh_link: r.u32(24)?,
                sh_info: r.u32(28)?,
                sh_addralign: r.u32(32)?.into(),
                sh_entsize: r.u32(36)?.into(),
            },
            ElfClass::Elf64 => Self {
                sh_name: r.u32(0)?,
                sh_type: r.u32(4)?,
                sh_flags: r.u64(8)?,
                sh_addr: r.u64(16)?,
                sh_offset: r.u64(24)?,
                sh_size: r.u64(32)?,
                sh_link: r.u32(40)?,
                sh_info: r.u32(44)?,
                sh_addralign: r.u64(48)?,
                sh_entsize: r.u64(56)?,
            },
        })
    }

    /// Returns `true` if the section occupies bytes in the file.
    pub fn has_file_data(&self) -> bool {
        self.sh_type != SHT_NULL && self.sh_type != SHT_NOBITS && self.sh_size > 0
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("sh_name".into(), self.sh_name.into());
        record.insert(
            "sh_type".into(),
            FieldValue::named(type_name(self.sh_type), "SHT", self.sh_type.into()),
        );
        record.insert("sh_flags".into(), self.sh_flags.into());
        record.insert("sh_addr".into(), self.sh_addr.into());
        record.insert("sh_offset".into(), self.sh_offset.into());
        record.insert("sh_size".into(), self.sh_size.into());
        record.insert("sh_link".into(), self.sh_link.into());
        record.insert("sh_info".into(), self.sh_info.into());
        record.insert("sh_addralign".into(), self.sh_addralign.into());
        record.insert("sh_entsize".into(), self.sh_entsize.into());
        record
    }
}

fn type_name(value: u32) -> Option<&'static str> {
    Some(match value {
        SHT_NULL => "SHT_NULL",
        1 => "SHT_PROGBITS",
        2 => "SHT_SYMTAB",
        3 => "SHT_STRTAB",
        4 => "SHT_RELA",
        5 => "SHT_HASH",
        6 => "SHT_DYNAMIC",
        7 => "SHT_NOTE",
        SHT_NOBITS => "SHT_NOBITS",
        9 => "SHT_REL",
        10 => "SHT_SHLIB",
        11 => "SHT_DYNSYM",
        14 => "SHT_INIT_ARRAY",
        15 => "SHT_FINI_ARRAY",
        16 => "SHT_PREINIT_ARRAY",
        17 => "SHT_GROUP",
        18 => "SHT_SYMTAB_SHNDX",
        0x6fff_fff5 => "SHT_GNU_ATTRIBUTES",
        0x6fff_fff6 => "SHT_GNU_HASH",
        0x6fff_fff7 => "SHT_GNU_LIBLIST",
        0x6fff_fffd => "SHT_GNU_verdef",
        0x6fff_fffe => "SHT_GNU_verneed",
        0x6fff_ffff => "SHT_GNU_versym",
        0x7000_0001 => "SHT_ARM_EXIDX",
        0x7000_0003 => "SHT_ARM_ATTRIBUTES",
        _ => return None,
    })
}

/// A NUL-terminated string table.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StringTable<'a> {
    data: &'a [u8],
}

impl<'a> StringTable<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// The string starting at `offset`, lossily decoded.
    ///
    /// Returns `None` if the offset is outside the table. A string missing
    /// its terminator runs to the end of the table.
    pub(crate) fn get(&self, offset: usize) -> Option<String> {
        let tail = self.data.get(offset..)?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Some(String::from_utf8_lossy(&tail[..end]).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_elf64_little_endian_entry() {
        let mut data = vec![0u8; 64];
        data[0..4].copy_from_slice(&7u32.to_le_bytes());
        data[4..8].copy_from_slice(&1u32.to_le_bytes());
        data[24..32].copy_from_slice(&0x200u64.to_le_bytes());
        data[32..40].copy_from_slice(&0x30u64.to_le_bytes());

        let sh = SectionHeader::parse(&data, ElfClass::Elf64, Endianness::Little).unwrap();
        assert_eq!(sh.sh_name, 7);
        assert_eq!(sh.sh_offset, 0x200);
        assert_eq!(sh.sh_size, 0x30);
        assert!(sh.has_file_data());
        assert_eq!(
            sh.to_record()["sh_type"],
            FieldValue::Enum("SHT_PROGBITS".into())
        );
    }

    #[test]
    fn nobits_has_no_file_data() {
        let mut data = vec![0u8; 40];
        data[4..8].copy_from_slice(&SHT_NOBITS.to_be_bytes());
        data[20..24].copy_from_slice(&0x100u32.to_be_bytes());

        let sh = SectionHeader::parse(&data, ElfClass::Elf32, Endianness::Big).unwrap();
        assert_eq!(sh.sh_size, 0x100);
        assert!(!sh.has_file_data());
    }

    #[test]
    fn short_entry_is_rejected() {
        let data = vec![0u8; 39];
        assert!(SectionHeader::parse(&data, ElfClass::Elf32, Endianness::Little).is_err());
    }

    #[test]
    fn string_table_lookup() {
        let table = StringTable::new(b"\0.text\0.data\0.bad");
        assert_eq!(table.get(0).as_deref(), Some(""));
        assert_eq!(table.get(1).as_deref(), Some(".text"));
        assert_eq!(table.get(7).as_deref(), Some(".data"));
        assert_eq!(table.get(13).as_deref(), Some(".bad"));
        assert_eq!(table.get(100), None);
    }
}
