use crate::FACILITY;
use anyhow::Result;
use bio::io::fasta;
use gb_io::reader::SeqReader;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

lazy_static! {
    static ref LOCUS_LINE: Regex = Regex::new(r"LOCUS\s+([^\n]+)").unwrap();
    static ref DEFINITION_BLOCK: Regex =
        Regex::new(r"DEFINITION\s+([^\n]+(?:\n\s+[^\n]+)*)").unwrap();
    static ref FOLDED_CONTINUATION: Regex = Regex::new(r"\n\s+").unwrap();
}

/// Raw text of one file picked up for import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedFile {
    pub filename: String,
    pub content: String,
    pub path: String,
}

/// Result of sequence extraction. An unparseable file yields an empty
/// sequence and a description saying why, never an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSequence {
    pub sequence: String,
    pub description: String,
}

/// Batch read of one directory, non-recursive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderImport {
    pub folder_path: String,
    pub files: Vec<ImportedFile>,
    pub total_files: usize,
    pub successful_files: usize,
}

/// Pulls a cleaned uppercase sequence and a description out of raw
/// file text. Format is sniffed from content first and filename
/// second: FASTA, then GenBank, then plain text. Each sniffed format
/// falls through to the next when it yields no sequence.
pub fn extract_sequence(content: &str, filename: &str) -> ExtractedSequence {
    let clean_content = content.trim();
    if clean_content.is_empty() {
        return ExtractedSequence {
            sequence: String::new(),
            description: format!("Empty file: {filename}"),
        };
    }
    let lower_name = filename.to_lowercase();

    if clean_content.starts_with('>') || has_extension(&lower_name, &["fasta", "fa", "fas"]) {
        if let Some(extracted) = extract_fasta(clean_content, filename) {
            return extracted;
        }
    }

    if clean_content.contains("LOCUS")
        || clean_content.contains("ORIGIN")
        || clean_content.contains("FEATURES")
        || has_extension(&lower_name, &["gb", "gbk", "genbank", "ape", "dna"])
    {
        if let Some(extracted) = extract_genbank(clean_content, filename) {
            return extracted;
        }
    }

    let plain = FACILITY.clean_dna_text(clean_content);
    if plain.len() > 10 {
        return ExtractedSequence {
            sequence: plain,
            description: format!("Plain text sequence from {filename}"),
        };
    }

    // Last resort: the longest line that still looks like DNA.
    let mut longest = String::new();
    for line in clean_content.lines() {
        let cleaned = FACILITY.clean_dna_text(line);
        if cleaned.len() > longest.len() && cleaned.len() > 20 {
            longest = cleaned;
        }
    }
    if longest.len() > 20 {
        return ExtractedSequence {
            sequence: longest,
            description: format!("Sequence extracted from {filename}"),
        };
    }

    ExtractedSequence {
        sequence: String::new(),
        description: format!("Could not parse: {filename}"),
    }
}

fn has_extension(lower_name: &str, extensions: &[&str]) -> bool {
    extensions
        .iter()
        .any(|extension| lower_name.ends_with(&format!(".{extension}")))
}

fn extract_fasta(content: &str, filename: &str) -> Option<ExtractedSequence> {
    if content.starts_with('>') {
        if let Some(found) = extract_fasta_with_reader(content, filename) {
            return Some(found);
        }
    }

    // Manual path: header optional, every remaining line is sequence.
    let lines: Vec<&str> = content.lines().collect();
    let (description, body) = if lines.first().is_some_and(|line| line.starts_with('>')) {
        (lines[0][1..].trim().to_string(), &lines[1..])
    } else {
        (format!("Sequence from {filename}"), &lines[..])
    };
    let sequence = FACILITY.clean_dna_text(&body.join(""));
    if sequence.is_empty() {
        return None;
    }
    let description = if description.is_empty() {
        format!("FASTA sequence from {filename}")
    } else {
        description
    };
    Some(ExtractedSequence { sequence, description })
}

/// Well-formed records go through the FASTA reader; the first record
/// wins and its header line becomes the description.
fn extract_fasta_with_reader(content: &str, filename: &str) -> Option<ExtractedSequence> {
    let record = fasta::Reader::new(content.as_bytes())
        .records()
        .filter_map(|record| record.ok())
        .next()?;
    let sequence = FACILITY.clean_dna_text(&String::from_utf8_lossy(record.seq()));
    if sequence.is_empty() {
        return None;
    }
    let header = match record.desc() {
        Some(desc) => format!("{} {}", record.id(), desc),
        None => record.id().to_string(),
    };
    let header = header.trim().to_string();
    let description = if header.is_empty() {
        format!("FASTA sequence from {filename}")
    } else {
        header
    };
    Some(ExtractedSequence { sequence, description })
}

fn extract_genbank(content: &str, filename: &str) -> Option<ExtractedSequence> {
    if let Some(found) = extract_genbank_with_reader(content, filename) {
        return Some(found);
    }

    // Manual path for files the strict reader rejects. The DEFINITION
    // block wins over the LOCUS line; continuation lines fold into one.
    let mut description = String::new();
    if let Some(caps) = LOCUS_LINE.captures(content) {
        description = format!("GenBank: {}", caps[1].trim());
    }
    if let Some(caps) = DEFINITION_BLOCK.captures(content) {
        description = FOLDED_CONTINUATION
            .replace_all(&caps[1], " ")
            .trim()
            .to_string();
    }

    let mut sequence = String::new();
    if let Some(origin_index) = content.find("ORIGIN") {
        let section = &content[origin_index..];
        let section = match section.find("//") {
            Some(end) => &section[..end],
            None => section,
        };
        sequence = FACILITY.clean_dna_text(&section.replace("ORIGIN", ""));
    }

    if sequence.is_empty() {
        return None;
    }
    let description = if description.is_empty() {
        format!("GenBank sequence from {filename}")
    } else {
        description
    };
    Some(ExtractedSequence { sequence, description })
}

fn extract_genbank_with_reader(content: &str, filename: &str) -> Option<ExtractedSequence> {
    let seq = SeqReader::new(content.as_bytes())
        .filter_map(|seq| seq.ok())
        .next()?;
    let sequence = FACILITY.clean_dna_text(&String::from_utf8_lossy(&seq.seq));
    if sequence.is_empty() {
        return None;
    }
    let description = seq
        .definition
        .or_else(|| seq.name.as_ref().map(|name| format!("GenBank: {name}")))
        .unwrap_or_else(|| format!("GenBank sequence from {filename}"));
    Some(ExtractedSequence { sequence, description })
}

pub fn read_file(path: &Path) -> Result<ImportedFile> {
    let bytes = fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(ImportedFile {
        filename,
        content: String::from_utf8_lossy(&bytes).to_string(),
        path: path.display().to_string(),
    })
}

/// Reads every regular file in a directory, sorted by filename so the
/// batch is reproducible. Hidden and temp-editor files are skipped;
/// unreadable files count as failures and the rest proceed.
pub fn read_folder(path: &Path) -> Result<FolderImport> {
    let mut names: Vec<String> = vec![];
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || name.starts_with('~') {
            continue;
        }
        let is_file = fs::metadata(entry.path())
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        names.push(name);
    }
    names.sort();

    let mut files = vec![];
    for name in &names {
        if let Ok(file) = read_file(&path.join(name)) {
            files.push(file);
        }
    }

    let successful_files = files.len();
    Ok(FolderImport {
        folder_path: path.display().to_string(),
        files,
        total_files: names.len(),
        successful_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        let result = extract_sequence("", "empty.txt");
        assert!(result.sequence.is_empty());
        assert_eq!(result.description, "Empty file: empty.txt");

        let blank = extract_sequence("   \n\t  ", "blank.txt");
        assert!(blank.sequence.is_empty());
        assert_eq!(blank.description, "Empty file: blank.txt");
    }

    #[test]
    fn test_fasta_with_header() {
        let content = ">pUC19 cloning vector\nATGCATGC\nGGTACC\n";
        let result = extract_sequence(content, "puc19.fasta");
        assert_eq!(result.sequence, "ATGCATGCGGTACC");
        assert_eq!(result.description, "pUC19 cloning vector");
    }

    #[test]
    fn test_fasta_cleans_case_and_noise() {
        let result = extract_sequence(">x\natg-catgc 123\nggta\n", "x.fa");
        assert_eq!(result.sequence, "ATGCATGCGGTA");
        assert_eq!(result.description, "x");
    }

    #[test]
    fn test_fasta_named_file_without_header() {
        let result = extract_sequence("ATGC\nGGTA", "raw.fa");
        assert_eq!(result.sequence, "ATGCGGTA");
        assert_eq!(result.description, "Sequence from raw.fa");
    }

    #[test]
    fn test_fasta_named_file_without_dna_falls_through() {
        let result = extract_sequence("xx!! 00 zz", "notes.fasta");
        assert!(result.sequence.is_empty());
        assert_eq!(result.description, "Could not parse: notes.fasta");
    }

    #[test]
    fn test_genbank_definition_and_origin() {
        let content = "LOCUS       TESTPLASMID             16 bp    DNA     circular SYN 01-JAN-2024\n\
                       DEFINITION  Test plasmid construct.\n\
                       FEATURES             Location/Qualifiers\n\
                       ORIGIN\n\
                       \x20       1 atgcatgcat gcatgc\n\
                       //\n";
        let result = extract_sequence(content, "test.gb");
        assert_eq!(result.sequence, "ATGCATGCATGCATGC");
        assert_eq!(result.description, "Test plasmid construct.");
    }

    #[test]
    fn test_genbank_falls_back_to_locus_description() {
        let content = "LOCUS       SHORTSEQ                12 bp    DNA     linear\n\
                       ORIGIN\n\
                       \x20       1 atgcatgcat gc\n\
                       //\n";
        let result = extract_sequence(content, "short.gbk");
        assert_eq!(result.sequence, "ATGCATGCATGC");
        assert!(
            result.description.starts_with("GenBank: SHORTSEQ"),
            "unexpected description: {}",
            result.description
        );
    }

    #[test]
    fn test_genbank_without_origin_falls_through() {
        let result = extract_sequence("FEATURES", "f.gb");
        assert!(result.sequence.is_empty());
        assert_eq!(result.description, "Could not parse: f.gb");
    }

    #[test]
    fn test_plain_text_sequence() {
        let result = extract_sequence("atgcatgcatgcatg", "seq.txt");
        assert_eq!(result.sequence, "ATGCATGCATGCATG");
        assert_eq!(result.description, "Plain text sequence from seq.txt");
    }

    #[test]
    fn test_short_plain_text_is_rejected() {
        let result = extract_sequence("atgcatgc", "tiny.txt");
        assert!(result.sequence.is_empty());
        assert_eq!(result.description, "Could not parse: tiny.txt");
    }

    #[test]
    fn test_read_folder_skips_hidden_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.fasta"), ">x\nATGC\n").unwrap();
        std::fs::write(dir.path().join("a.txt"), "atgcatgcatgcatg").unwrap();
        // Unknown extensions are still read; only hidden files, editor
        // leftovers and directories are skipped.
        std::fs::write(dir.path().join("c.xyz"), "gattacagattacagattaca").unwrap();
        std::fs::write(dir.path().join(".hidden"), "nope").unwrap();
        std::fs::write(dir.path().join("~lock"), "nope").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let import = read_folder(dir.path()).unwrap();
        assert_eq!(import.total_files, 3);
        assert_eq!(import.successful_files, 3);
        let names: Vec<&str> = import
            .files
            .iter()
            .map(|file| file.filename.as_str())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.fasta", "c.xyz"]);
        assert_eq!(import.files[1].content, ">x\nATGC\n");
    }

    #[test]
    fn test_read_file_missing_path_errors() {
        assert!(read_file(Path::new("/nonexistent/never.fa")).is_err());
    }
}
