//! Report rendering for the terminal.

use std::fmt::Write;

use colored::Colorize;
use elfcmp_diff::{
    BlocksDiff, DataComparison, Delta, DiffReport, HeaderDiff, SectionsDiff, SegmentsDiff,
};
use elfcmp_types::Segment;

pub fn json(report: &DiffReport) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(report)?;
    out.push('\n');
    Ok(out)
}

/// Human-readable report. Only parts with findings are printed.
pub fn text(report: &DiffReport, left: &str, right: &str) -> anyhow::Result<String> {
    let mut out = String::new();
    write_text(&mut out, report, left, right)?;
    Ok(out)
}

fn write_text(out: &mut String, report: &DiffReport, left: &str, right: &str) -> std::fmt::Result {
    writeln!(out, "{} {}", "---".red(), left)?;
    writeln!(out, "{} {}", "+++".green(), right)?;

    if report.is_empty() {
        writeln!(out, "{}", "Files are structurally identical".green().bold())?;
    }
    if !report.header_diff.is_empty() {
        heading(out, "ELF header")?;
        write_fields(out, "  ", &report.header_diff)?;
    }
    if !report.segments_diff.is_empty() {
        heading(out, "Segments")?;
        write_segments(out, &report.segments_diff)?;
    }
    if !report.sections_diff.is_empty() {
        heading(out, "Sections")?;
        write_sections(out, &report.sections_diff)?;
    }
    if !report.blocks_diff.is_empty() {
        heading(out, "Blocks")?;
        write_blocks(out, &report.blocks_diff)?;
    }
    if report.has_warnings() {
        heading(out, "Warnings")?;
        for warning in &report.warnings {
            writeln!(out, "  {} {warning}", "!".yellow().bold())?;
        }
    }
    Ok(())
}

fn heading(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out, "{}", title.bold().underline())
}

fn write_fields(out: &mut String, indent: &str, diff: &HeaderDiff) -> std::fmt::Result {
    for key in &diff.left_only {
        writeln!(out, "{indent}{} {key}", "-".red())?;
    }
    for key in &diff.right_only {
        writeln!(out, "{indent}{} {key}", "+".green())?;
    }
    for (key, (l, r)) in &diff.changed {
        writeln!(
            out,
            "{indent}{key}: {} -> {}",
            l.to_string().red(),
            r.to_string().green()
        )?;
    }
    Ok(())
}

fn write_data(out: &mut String, indent: &str, data: &DataComparison) -> std::fmt::Result {
    match data {
        DataComparison::Equal => Ok(()),
        DataComparison::SizeMismatch { left, right } => writeln!(
            out,
            "{indent}data size: {} -> {}",
            format!("{left:#x}").red(),
            format!("{right:#x}").green()
        ),
        DataComparison::ContentMismatch { first_difference } => writeln!(
            out,
            "{indent}data differs at offset {}",
            format!("{first_difference:#x}").yellow()
        ),
    }
}

fn describe_segment(segment: &Segment) -> String {
    format!(
        "#{} at {:#x} (size {:#x})",
        segment.index, segment.block.offset, segment.block.size
    )
}

fn write_segments(out: &mut String, diff: &SegmentsDiff) -> std::fmt::Result {
    for (kind, segments) in &diff.left_only {
        for segment in segments {
            writeln!(out, "  {} {kind} {}", "-".red(), describe_segment(segment))?;
        }
    }
    for (kind, segments) in &diff.right_only {
        for segment in segments {
            writeln!(out, "  {} {kind} {}", "+".green(), describe_segment(segment))?;
        }
    }
    for (kind, group) in &diff.common {
        for (rank, pair) in group.pairs.iter().enumerate() {
            if !pair.is_empty() {
                writeln!(out, "  {kind}[{rank}]")?;
                write_fields(out, "    ", pair)?;
            }
        }
        for segment in &group.left_unmatched {
            writeln!(out, "  {} {kind} {}", "-".red(), describe_segment(segment))?;
        }
        for segment in &group.right_unmatched {
            writeln!(out, "  {} {kind} {}", "+".green(), describe_segment(segment))?;
        }
    }
    Ok(())
}

fn write_sections(out: &mut String, diff: &SectionsDiff) -> std::fmt::Result {
    for name in &diff.left_only {
        writeln!(out, "  {} {}", "-".red(), display_name(name))?;
    }
    for name in &diff.right_only {
        writeln!(out, "  {} {}", "+".green(), display_name(name))?;
    }
    for (name, section) in diff.changed() {
        writeln!(out, "  {}", display_name(name))?;
        write_fields(out, "    ", &section.header)?;
        write_data(out, "    ", &section.data)?;
    }
    Ok(())
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "<unnamed>"
    } else {
        name
    }
}

fn write_blocks(out: &mut String, diff: &BlocksDiff) -> std::fmt::Result {
    if !diff.unused_counts.agree() {
        writeln!(
            out,
            "  unused blocks: {} -> {}",
            diff.unused_counts.left.to_string().red(),
            diff.unused_counts.right.to_string().green()
        )?;
    }
    for pair in &diff.unused_diffs {
        writeln!(out, "  {} / {}", pair.left, pair.right)?;
        write_data(out, "    ", &pair.data)?;
    }
    for (side, overlaps) in [("left", &diff.overlaps.left), ("right", &diff.overlaps.right)] {
        for overlap in overlaps {
            writeln!(
                out,
                "  {} {side}: {} and {} share [{:#x}-{:#x})",
                "overlap".yellow(),
                overlap.first,
                overlap.second,
                overlap.start,
                overlap.end
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use elfcmp_diff::{compare_bytes, DiffConfig};
    use elfcmp_elf::{ElfBuilder, SectionSpec, SegmentSpec};

    fn render(left: ElfBuilder, right: ElfBuilder) -> String {
        colored::control::set_override(false);
        let report = compare_bytes(left.build(), right.build(), &DiffConfig::default()).unwrap();
        text(&report, "a.out", "b.out").unwrap()
    }

    fn image() -> ElfBuilder {
        ElfBuilder::new()
            .entry(0x401000)
            .section(SectionSpec::progbits(".text", vec![0x90; 16]))
            .segment(SegmentSpec::new(1, 0, 0x80))
    }

    #[test]
    fn identical_report() {
        let out = render(image(), image());
        assert!(out.starts_with("--- a.out\n+++ b.out\n"));
        assert!(out.contains("Files are structurally identical"));
        assert!(!out.contains("ELF header"));
    }

    #[test]
    fn header_change_in_hex() {
        let out = render(image(), image().entry(0x402000));
        assert!(out.contains("ELF header"));
        assert!(out.contains("e_entry: 0x401000 -> 0x402000"));
        assert!(!out.contains("Sections"));
        assert!(!out.contains("Segments"));
        assert!(!out.contains("identical"));
    }

    #[test]
    fn section_and_segment_changes() {
        let right = ElfBuilder::new()
            .entry(0x401000)
            .section(SectionSpec::progbits(".text", vec![0x90; 24]))
            .section(SectionSpec::progbits(".extra", vec![1]))
            .segment(SegmentSpec::new(1, 0, 0x80).flags(5));

        let out = render(image(), right);
        assert!(out.contains("Sections"));
        assert!(out.contains("+ .extra"));
        assert!(out.contains("data size: 0x10 -> 0x18"));
        assert!(out.contains("PT_LOAD[0]"));
        assert!(out.contains("p_flags: 0x4 -> 0x5"));
    }

    #[test]
    fn overlaps_and_warnings() {
        let left = ElfBuilder::new()
            .section(SectionSpec::progbits(".a", vec![1; 16]))
            .section(SectionSpec::progbits(".a", vec![2; 8]).at(72));
        let right = ElfBuilder::new().section(SectionSpec::progbits(".a", vec![2; 8]));

        let out = render(left, right);
        assert!(out.contains("Blocks"));
        assert!(out.contains("overlap left: section(.a):[0x40-0x50) and section(.a):[0x48-0x50)"));
        assert!(out.contains("Warnings"));
        assert!(out.contains("left: ambiguous section identity \".a\""));
    }

    #[test]
    fn json_is_pretty_and_parseable() {
        let report = compare_bytes(
            image().build(),
            image().entry(0).build(),
            &DiffConfig::default(),
        )
        .unwrap();
        let out = json(&report).unwrap();
        assert!(out.ends_with("}\n"));

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["header_diff"]["changed"]["e_entry"].is_array());
    }
}
