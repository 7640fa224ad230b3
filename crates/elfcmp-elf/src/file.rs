//! Whole-file decoding into a [`ParsedFile`].

use std::path::Path;

use elfcmp_types::{ParsedFile, Section, Segment};
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::header::{ElfHeader, TableCounts};
use crate::section::{SectionHeader, StringTable};
use crate::segment::ProgramHeader;

/// Read and decode the ELF file at `path`.
pub fn load(path: impl AsRef<Path>) -> ParseResult<ParsedFile> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    debug!(path = %path.display(), size = data.len(), "loaded input");
    parse(data)
}

/// Decode raw ELF bytes.
pub fn parse(data: Vec<u8>) -> ParseResult<ParsedFile> {
    let header = ElfHeader::parse(&data)?;
    let parse_section =
        |entry: &[u8]| SectionHeader::parse(entry, header.class, header.endianness);

    let initial = if header.uses_extended_numbering() {
        read_table(
            &data,
            header.e_shoff,
            1,
            header.e_shentsize,
            SectionHeader::entry_size(header.class),
            "section header table",
            &parse_section,
        )?
        .pop()
    } else {
        None
    };
    let counts = header.table_counts(initial.as_ref());
    if initial.is_some() {
        debug!(
            shnum = counts.shnum,
            phnum = counts.phnum,
            shstrndx = counts.shstrndx,
            "resolved extended section numbering"
        );
    }

    let section_headers = read_table(
        &data,
        header.e_shoff,
        counts.shnum,
        header.e_shentsize,
        SectionHeader::entry_size(header.class),
        "section header table",
        &parse_section,
    )?;
    let program_headers = read_table(
        &data,
        header.e_phoff,
        counts.phnum,
        header.e_phentsize,
        ProgramHeader::entry_size(header.class),
        "program header table",
        |entry| ProgramHeader::parse(entry, header.class, header.endianness),
    )?;

    let names = section_names(&data, &counts, &section_headers);
    let sections: Vec<Section> = section_headers
        .iter()
        .enumerate()
        .map(|(index, sh)| {
            let name = names.get(sh.sh_name as usize).unwrap_or_default();
            let section = Section::new(index, name, sh.to_record(), sh.sh_offset, sh.sh_size);
            if sh.has_file_data() {
                section
            } else {
                section.without_file_data()
            }
        })
        .collect();

    let segments: Vec<Segment> = program_headers
        .iter()
        .enumerate()
        .map(|(index, ph)| Segment::new(index, ph.kind(), ph.to_record(), ph.p_offset, ph.p_filesz))
        .collect();

    debug!(
        class = ?header.class,
        size = data.len(),
        sections = sections.len(),
        segments = segments.len(),
        "parsed ELF file"
    );

    let record = header.to_record(&data);
    let structure = header.structure_blocks(&counts);
    Ok(ParsedFile::new(data, record, sections, segments, structure))
}

fn read_table<T>(
    data: &[u8],
    offset: u64,
    count: u64,
    entsize: u16,
    min_entsize: usize,
    context: &'static str,
    parse_entry: impl Fn(&[u8]) -> ParseResult<T>,
) -> ParseResult<Vec<T>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if usize::from(entsize) < min_entsize {
        return Err(ParseError::invalid_structure(
            context,
            offset,
            format!("entry size {entsize} is smaller than {min_entsize}"),
        ));
    }

    let end = count
        .checked_mul(entsize.into())
        .and_then(|len| len.checked_add(offset))
        .ok_or(ParseError::Overflow { context })?;
    if end > data.len() as u64 {
        return Err(ParseError::too_short(end, data.len()));
    }

    // `end` fits in the file, so every offset and the count fit in usize.
    let start = offset as usize;
    let stride = usize::from(entsize);
    (0..count as usize)
        .map(|i| parse_entry(&data[start + i * stride..start + (i + 1) * stride]))
        .collect()
}

fn section_names<'a>(
    data: &'a [u8],
    counts: &TableCounts,
    sections: &[SectionHeader],
) -> StringTable<'a> {
    if counts.shstrndx == 0 {
        return StringTable::default();
    }
    let Some(shstrtab) = usize::try_from(counts.shstrndx)
        .ok()
        .and_then(|index| sections.get(index))
    else {
        return StringTable::default();
    };
    let range = usize::try_from(shstrtab.sh_offset).ok().and_then(|start| {
        let end = start.checked_add(usize::try_from(shstrtab.sh_size).ok()?)?;
        data.get(start..end)
    });
    match range {
        Some(bytes) => StringTable::new(bytes),
        None => {
            debug!(
                offset = shstrtab.sh_offset,
                size = shstrtab.sh_size,
                "section name table outside file"
            );
            StringTable::default()
        }
    }
}
