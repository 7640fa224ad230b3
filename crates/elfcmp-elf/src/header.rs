//! ELF file header parsing.

use elfcmp_types::{Block, BlockKind, FieldValue, Record};

use crate::error::{ParseError, ParseResult};
use crate::reader::{Endianness, Reader};
use crate::section::SectionHeader;

/// ELF magic bytes.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

const EI_NIDENT: usize = 16;

/// `e_phnum` escape: the real count is in `sh_info` of section header 0.
pub const PN_XNUM: u16 = 0xffff;

/// `e_shstrndx` escape: the real index is in `sh_link` of section header 0.
pub const SHN_XINDEX: u16 = 0xffff;

/// ELF class (32-bit or 64-bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

impl ElfClass {
    fn name(self) -> &'static str {
        match self {
            Self::Elf32 => "ELFCLASS32",
            Self::Elf64 => "ELFCLASS64",
        }
    }
}

/// Parsed ELF file header.
#[derive(Debug, Clone)]
pub struct ElfHeader {
    pub class: ElfClass,
    pub endianness: Endianness,
    /// Identification version (`EI_VERSION`).
    pub ident_version: u8,
    pub osabi: u8,
    pub abi_version: u8,
    pub e_type: u16,
    pub e_machine: u16,
    pub e_version: u32,
    pub e_entry: u64,
    pub e_phoff: u64,
    pub e_shoff: u64,
    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,
    pub e_phnum: u16,
    pub e_shentsize: u16,
    pub e_shnum: u16,
    pub e_shstrndx: u16,
}

impl ElfHeader {
    /// Parse an ELF header from the start of a file.
    pub fn parse(data: &[u8]) -> ParseResult<Self> {
        if data.is_empty() {
            return Err(ParseError::Empty);
        }
        if data.len() < EI_NIDENT {
            return Err(ParseError::too_short(EI_NIDENT as u64, data.len()));
        }
        if data[0..4] != ELF_MAGIC {
            return Err(ParseError::invalid_magic("ELF", &data[0..4]));
        }

        let class = match data[4] {
            1 => ElfClass::Elf32,
            2 => ElfClass::Elf64,
            other => {
                return Err(ParseError::invalid_structure(
                    "ELF header",
                    4,
                    format!("invalid ELF class: {other}"),
                ))
            }
        };
        let endianness = match data[5] {
            1 => Endianness::Little,
            2 => Endianness::Big,
            other => {
                return Err(ParseError::invalid_structure(
                    "ELF header",
                    5,
                    format!("invalid data encoding: {other}"),
                ))
            }
        };

        let r = Reader::new(data, endianness, "ELF header");
        let (ident_version, osabi, abi_version) = (r.u8(6)?, r.u8(7)?, r.u8(8)?);

        match class {
            ElfClass::Elf32 => {
                r.require(52)?;
                Ok(Self {
                    class,
                    endianness,
                    ident_version,
                    osabi,
                    abi_version,
                    e_type: r.u16(16)?,
                    e_machine: r.u16(18)?,
                    e_version: r.u32(20)?,
                    e_entry: r.u32(24)?.into(),
                    e_phoff: r.u32(28)?.into(),
                    e_shoff: r.u32(32)?.into(),
                    e_flags: r.u32(36)?,
                    e_ehsize: r.u16(40)?,
                    e_phentsize: r.u16(42)?,
                    e_phnum: r.u16(44)?,
                    e_shentsize: r.u16(46)?,
                    e_shnum: r.u16(48)?,
                    e_shstrndx: r.u16(50)?,
                })
            }
            ElfClass::Elf64 => {
                r.require(64)?;
                Ok(Self {
                    class,
                    endianness,
                    ident_version,
                    osabi,
                    abi_version,
                    e_type: r.u16(16)?,
                    e_machine: r.u16(18)?,
                    e_version: r.u32(20)?,
                    e_entry: r.u64(24)?,
                    e_phoff: r.u64(32)?,
                    e_shoff: r.u64(40)?,
                    e_flags: r.u32(48)?,
                    e_ehsize: r.u16(52)?,
                    e_phentsize: r.u16(54)?,
                    e_phnum: r.u16(56)?,
                    e_shentsize: r.u16(58)?,
                    e_shnum: r.u16(60)?,
                    e_shstrndx: r.u16(62)?,
                })
            }
        }
    }

    /// Flatten the header into a field record.
    ///
    /// The identification bytes become ordinary `EI_*` fields so they diff
    /// like any other field.
    pub fn to_record(&self, data: &[u8]) -> Record {
        let mut record = Record::new();
        let mut put = |name: &str, value: FieldValue| {
            record.insert(name.to_string(), value);
        };

        put("EI_MAG", FieldValue::Bytes(data[0..4].to_vec()));
        put("EI_CLASS", FieldValue::Enum(self.class.name().into()));
        put(
            "EI_DATA",
            FieldValue::Enum(
                match self.endianness {
                    Endianness::Little => "ELFDATA2LSB",
                    Endianness::Big => "ELFDATA2MSB",
                }
                .into(),
            ),
        );
        put("EI_VERSION", self.ident_version.into());
        put(
            "EI_OSABI",
            FieldValue::named(osabi_name(self.osabi), "ELFOSABI", self.osabi.into()),
        );
        put("EI_ABIVERSION", self.abi_version.into());
        put(
            "e_type",
            FieldValue::named(type_name(self.e_type), "ET", self.e_type.into()),
        );
        put(
            "e_machine",
            FieldValue::named(machine_name(self.e_machine), "EM", self.e_machine.into()),
        );
        put("e_version", self.e_version.into());
        put("e_entry", self.e_entry.into());
        put("e_phoff", self.e_phoff.into());
        put("e_shoff", self.e_shoff.into());
        put("e_flags", self.e_flags.into());
        put("e_ehsize", self.e_ehsize.into());
        put("e_phentsize", self.e_phentsize.into());
        put("e_phnum", self.e_phnum.into());
        put("e_shentsize", self.e_shentsize.into());
        put("e_shnum", self.e_shnum.into());
        put("e_shstrndx", self.e_shstrndx.into());
        record
    }

    /// Whether any table count or the name-table index is stored in
    /// section header 0 instead of the file header.
    pub fn uses_extended_numbering(&self) -> bool {
        self.e_shoff != 0
            && (self.e_shnum == 0 || self.e_phnum == PN_XNUM || self.e_shstrndx == SHN_XINDEX)
    }

    /// Resolve the table counts, taking escaped values from `initial`
    /// (section header 0) when the file header defers to it.
    pub fn table_counts(&self, initial: Option<&SectionHeader>) -> TableCounts {
        let shnum = match (self.e_shnum, initial) {
            (0, Some(sh)) => sh.sh_size,
            (n, _) => n.into(),
        };
        let phnum = match (self.e_phnum, initial) {
            (PN_XNUM, Some(sh)) => sh.sh_info.into(),
            (n, _) => n.into(),
        };
        let shstrndx = match (self.e_shstrndx, initial) {
            (SHN_XINDEX, Some(sh)) => sh.sh_link.into(),
            (n, _) => n.into(),
        };
        TableCounts {
            shnum,
            phnum,
            shstrndx,
        }
    }

    /// Blocks owned by the header itself and the two header tables.
    pub fn structure_blocks(&self, counts: &TableCounts) -> Vec<Block> {
        vec![
            Block::new(0, self.e_ehsize.into(), BlockKind::FileHeader),
            Block::new(
                self.e_phoff,
                u64::from(self.e_phentsize).saturating_mul(counts.phnum),
                BlockKind::ProgramHeaderTable,
            ),
            Block::new(
                self.e_shoff,
                u64::from(self.e_shentsize).saturating_mul(counts.shnum),
                BlockKind::SectionHeaderTable,
            ),
        ]
    }
}

/// Header table sizes after extended numbering is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCounts {
    pub shnum: u64,
    pub phnum: u64,
    pub shstrndx: u64,
}

fn osabi_name(value: u8) -> Option<&'static str> {
    Some(match value {
        0 => "ELFOSABI_SYSV",
        1 => "ELFOSABI_HPUX",
        2 => "ELFOSABI_NETBSD",
        3 => "ELFOSABI_LINUX",
        6 => "ELFOSABI_SOLARIS",
        7 => "ELFOSABI_AIX",
        8 => "ELFOSABI_IRIX",
        9 => "ELFOSABI_FREEBSD",
        10 => "ELFOSABI_TRU64",
        11 => "ELFOSABI_MODESTO",
        12 => "ELFOSABI_OPENBSD",
        97 => "ELFOSABI_ARM",
        255 => "ELFOSABI_STANDALONE",
        _ => return None,
    })
}

fn type_name(value: u16) -> Option<&'static str> {
    Some(match value {
        0 => "ET_NONE",
        1 => "ET_REL",
        2 => "ET_EXEC",
        3 => "ET_DYN",
        4 => "ET_CORE",
        _ => return None,
    })
}

fn machine_name(value: u16) -> Option<&'static str> {
    Some(match value {
        0 => "EM_NONE",
        3 => "EM_386",
        8 => "EM_MIPS",
        20 => "EM_PPC",
        21 => "EM_PPC64",
        22 => "EM_S390",
        40 => "EM_ARM",
        62 => "EM_X86_64",
        183 => "EM_AARCH64",
        243 => "EM_RISCV",
        247 => "EM_BPF",
        258 => "EM_LOONGARCH",
        _ => return None,
    })
}
