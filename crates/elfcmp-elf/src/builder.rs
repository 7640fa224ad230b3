//! Minimal ELF64 little-endian image writer.
//!
//! Produces just enough structure for the parser: file header, program
//! headers right after it, section contents in declaration order, the
//! section-name string table and finally the section header table.
//! Alignment gaps are filled with a configurable byte so unused-block
//! content can be varied between two images.

use crate::header::{PN_XNUM, SHN_XINDEX};
use crate::section::SHT_NOBITS;

const EHDR_SIZE: usize = 64;
const PHDR_SIZE: usize = 56;
const SHDR_SIZE: usize = 64;
const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;

/// One section to emit.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    name: String,
    sh_type: u32,
    flags: u64,
    addr: u64,
    data: Vec<u8>,
    size: u64,
    align: u64,
    offset: Option<u64>,
}

impl SectionSpec {
    /// A section whose content is stored in the file.
    pub fn progbits(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            sh_type: SHT_PROGBITS,
            flags: 0,
            addr: 0,
            size: data.len() as u64,
            data,
            align: 1,
            offset: None,
        }
    }

    /// A section occupying memory but no file bytes.
    pub fn nobits(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            sh_type: SHT_NOBITS,
            flags: 0,
            addr: 0,
            data: Vec::new(),
            size,
            align: 1,
            offset: None,
        }
    }

    pub fn sh_type(mut self, sh_type: u32) -> Self {
        self.sh_type = sh_type;
        self
    }

    pub fn flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    pub fn addr(mut self, addr: u64) -> Self {
        self.addr = addr;
        self
    }

    pub fn align(mut self, align: u64) -> Self {
        self.align = align.max(1);
        self
    }

    /// Place the content at a fixed file offset, possibly on top of bytes
    /// already written. Used to build self-overlapping images.
    pub fn at(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// One program header to emit. Offsets are taken verbatim.
#[derive(Debug, Clone)]
pub struct SegmentSpec {
    p_type: u32,
    p_flags: u32,
    offset: u64,
    filesz: u64,
    vaddr: u64,
    memsz: u64,
    align: u64,
}

impl SegmentSpec {
    pub fn new(p_type: u32, offset: u64, filesz: u64) -> Self {
        Self {
            p_type,
            p_flags: 4,
            offset,
            filesz,
            vaddr: offset,
            memsz: filesz,
            align: 1,
        }
    }

    pub fn flags(mut self, p_flags: u32) -> Self {
        self.p_flags = p_flags;
        self
    }

    pub fn vaddr(mut self, vaddr: u64) -> Self {
        self.vaddr = vaddr;
        self
    }

    pub fn memsz(mut self, memsz: u64) -> Self {
        self.memsz = memsz;
        self
    }

    pub fn align(mut self, align: u64) -> Self {
        self.align = align;
        self
    }
}

/// Builder for ELF64 little-endian images.
#[derive(Debug, Clone)]
pub struct ElfBuilder {
    e_type: u16,
    machine: u16,
    osabi: u8,
    abi_version: u8,
    entry: u64,
    flags: u32,
    fill: u8,
    extended_numbering: bool,
    sections: Vec<SectionSpec>,
    segments: Vec<SegmentSpec>,
    trailer: Vec<u8>,
}

impl Default for ElfBuilder {
    fn default() -> Self {
        Self {
            e_type: 2,
            machine: 62,
            osabi: 0,
            abi_version: 0,
            entry: 0,
            flags: 0,
            fill: 0,
            extended_numbering: false,
            sections: Vec::new(),
            segments: Vec::new(),
            trailer: Vec::new(),
        }
    }
}

impl ElfBuilder {
    /// An `ET_EXEC` / `EM_X86_64` image with no sections or segments.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_type(mut self, e_type: u16) -> Self {
        self.e_type = e_type;
        self
    }

    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    pub fn osabi(mut self, osabi: u8, abi_version: u8) -> Self {
        self.osabi = osabi;
        self.abi_version = abi_version;
        self
    }

    pub fn entry(mut self, entry: u64) -> Self {
        self.entry = entry;
        self
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Byte written into alignment gaps.
    pub fn fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    /// Store the section count, program header count and name-table index
    /// in section header 0, escaping them in the file header.
    pub fn extended_numbering(mut self) -> Self {
        self.extended_numbering = true;
        self
    }

    pub fn section(mut self, section: SectionSpec) -> Self {
        self.sections.push(section);
        self
    }

    pub fn segment(mut self, segment: SegmentSpec) -> Self {
        self.segments.push(segment);
        self
    }

    /// Bytes appended after the section header table.
    pub fn trailer(mut self, bytes: Vec<u8>) -> Self {
        self.trailer = bytes;
        self
    }

    /// Serialize the image.
    pub fn build(&self) -> Vec<u8> {
        let phnum = self.segments.len();
        let mut buf = vec![0u8; EHDR_SIZE + PHDR_SIZE * phnum];

        // Section-name string table: "\0name1\0name2\0...\0.shstrtab\0".
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::with_capacity(self.sections.len());
        for spec in &self.sections {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(spec.name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");

        // Null entry first, then declared sections, then .shstrtab.
        let mut headers = vec![[0u8; SHDR_SIZE]];
        for (spec, &name) in self.sections.iter().zip(&name_offsets) {
            let offset = self.place(&mut buf, spec);
            headers.push(section_header(
                name,
                spec.sh_type,
                spec.flags,
                spec.addr,
                offset,
                spec.size,
                spec.align,
            ));
        }
        let shstrtab_offset = buf.len() as u64;
        buf.extend_from_slice(&shstrtab);
        headers.push(section_header(
            shstrtab_name,
            SHT_STRTAB,
            0,
            0,
            shstrtab_offset,
            shstrtab.len() as u64,
            1,
        ));

        let shnum = headers.len() as u16;
        if self.extended_numbering {
            put_u64(&mut headers[0], 32, shnum.into());
            put_u32(&mut headers[0], 40, u32::from(shnum - 1));
            put_u32(&mut headers[0], 44, phnum as u32);
        }

        let shoff = align_up(buf.len() as u64, 8);
        buf.resize(shoff as usize, self.fill);
        for header in &headers {
            buf.extend_from_slice(header);
        }
        buf.extend_from_slice(&self.trailer);

        self.write_file_header(&mut buf, shoff, shnum);
        for (i, seg) in self.segments.iter().enumerate() {
            let at = EHDR_SIZE + i * PHDR_SIZE;
            put_u32(&mut buf, at, seg.p_type);
            put_u32(&mut buf, at + 4, seg.p_flags);
            put_u64(&mut buf, at + 8, seg.offset);
            put_u64(&mut buf, at + 16, seg.vaddr);
            put_u64(&mut buf, at + 24, seg.vaddr);
            put_u64(&mut buf, at + 32, seg.filesz);
            put_u64(&mut buf, at + 40, seg.memsz);
            put_u64(&mut buf, at + 48, seg.align);
        }
        buf
    }

    /// Write a section's content and return its file offset.
    fn place(&self, buf: &mut Vec<u8>, spec: &SectionSpec) -> u64 {
        let offset = match spec.offset {
            Some(offset) => offset,
            None => align_up(buf.len() as u64, spec.align),
        };
        if spec.data.is_empty() {
            if spec.offset.is_none() {
                buf.resize(offset as usize, self.fill);
            }
            return offset;
        }

        let start = offset as usize;
        let end = start + spec.data.len();
        if buf.len() < end {
            buf.resize(end, self.fill);
        }
        buf[start..end].copy_from_slice(&spec.data);
        offset
    }

    fn write_file_header(&self, buf: &mut [u8], shoff: u64, shnum: u16) {
        let phnum = self.segments.len() as u16;
        buf[0..4].copy_from_slice(b"\x7fELF");
        buf[4] = 2; // ELFCLASS64
        buf[5] = 1; // ELFDATA2LSB
        buf[6] = 1; // EV_CURRENT
        buf[7] = self.osabi;
        buf[8] = self.abi_version;
        put_u16(buf, 16, self.e_type);
        put_u16(buf, 18, self.machine);
        put_u32(buf, 20, 1);
        put_u64(buf, 24, self.entry);
        put_u64(buf, 32, if phnum > 0 { EHDR_SIZE as u64 } else { 0 });
        put_u64(buf, 40, shoff);
        put_u32(buf, 48, self.flags);
        put_u16(buf, 52, EHDR_SIZE as u16);
        put_u16(buf, 54, PHDR_SIZE as u16);
        put_u16(buf, 58, SHDR_SIZE as u16);
        if self.extended_numbering {
            put_u16(buf, 56, PN_XNUM);
            put_u16(buf, 60, 0);
            put_u16(buf, 62, SHN_XINDEX);
        } else {
            put_u16(buf, 56, phnum);
            put_u16(buf, 60, shnum);
            put_u16(buf, 62, shnum - 1);
        }
    }
}

fn section_header(
    name: u32,
    sh_type: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    align: u64,
) -> [u8; SHDR_SIZE] {
    let mut entry = [0u8; SHDR_SIZE];
    put_u32(&mut entry, 0, name);
    put_u32(&mut entry, 4, sh_type);
    put_u64(&mut entry, 8, flags);
    put_u64(&mut entry, 16, addr);
    put_u64(&mut entry, 24, offset);
    put_u64(&mut entry, 32, size);
    put_u64(&mut entry, 48, align);
    entry
}

fn align_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align.max(1)) * align.max(1)
}

fn put_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(buf: &mut [u8], at: usize, value: u64) {
    buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
}
