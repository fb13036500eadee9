use crate::analysis::analyze_sequence;
use crate::golden_gate::{
    analyze_part_compatibility, generate_assembly_reaction, suggest_optimal_overhangs,
    DEFAULT_ASSEMBLY_ENZYME,
};
use crate::insert_region::find_insert_regions;
use crate::overhang_validation::validate_overhangs;
use crate::part::{Folder, Part, PartFeature, DEFAULT_FOLDER_ID};
use crate::part_store::{DeleteOutcome, PartStore};
use crate::sequence_import::{extract_sequence, read_file, read_folder, ImportedFile};
use crate::type2s_enzyme::Strand;
use crate::ENZYMES;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, error::Error, fmt, path::Path};

pub type PartId = String;
pub type OpId = String;
pub type RunId = String;

/// The whole persistent library: the part store plus free-form
/// metadata callers may stash alongside it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryState {
    pub store: PartStore,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl LibraryState {
    pub fn load_from_path(path: &str) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError {
            code: ErrorCode::Io,
            message: format!("Could not read state file '{path}': {e}"),
        })?;
        serde_json::from_str(&text).map_err(|e| EngineError {
            code: ErrorCode::InvalidInput,
            message: format!("Could not parse state JSON '{path}': {e}"),
        })
    }

    pub fn save_to_path(&self, path: &str) -> Result<(), EngineError> {
        let text = serde_json::to_string_pretty(self).map_err(|e| EngineError {
            code: ErrorCode::Internal,
            message: format!("Could not serialize state: {e}"),
        })?;
        std::fs::write(path, text).map_err(|e| EngineError {
            code: ErrorCode::Io,
            message: format!("Could not write state file '{path}': {e}"),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    FindSites {
        sequence: String,
        enzyme: String,
    },
    AnalyzeSequence {
        sequence: String,
    },
    FindInsertRegions {
        sequence: String,
        enzyme: Option<String>,
    },
    ValidateOverhangs {
        overhangs: Vec<String>,
    },
    AnalyzePartCompatibility {
        part_ids: Vec<PartId>,
    },
    GenerateAssemblyReaction {
        part_ids: Vec<PartId>,
        enzyme: Option<String>,
    },
    SuggestOptimalOverhangs {
        part_types: Vec<String>,
        level: Option<u8>,
    },
    ImportFile {
        path: String,
        as_id: Option<PartId>,
        folder: Option<String>,
    },
    ImportFolder {
        path: String,
        folder: Option<String>,
    },
    AddPart {
        id: Option<PartId>,
        name: String,
        sequence: String,
        description: Option<String>,
        part_type: Option<String>,
        level: Option<u8>,
        folder: Option<String>,
    },
    UpdatePart {
        id: PartId,
        name: Option<String>,
        description: Option<String>,
        sequence: Option<String>,
        part_type: Option<String>,
        level: Option<u8>,
        resistance: Option<String>,
        origin: Option<String>,
        folder: Option<String>,
    },
    DeletePart {
        id: PartId,
    },
    DeleteParts {
        ids: Vec<PartId>,
    },
    MoveParts {
        ids: Vec<PartId>,
        folder_id: String,
    },
    CreateFolder {
        id: Option<String>,
        name: String,
        description: Option<String>,
        color: Option<String>,
    },
    UpdateFolder {
        id: String,
        name: Option<String>,
        description: Option<String>,
        color: Option<String>,
    },
    DeleteFolder {
        id: String,
        move_to: Option<String>,
    },
    LoadSampleData,
    ListParts {
        folder: Option<String>,
    },
    GetPart {
        id: Option<PartId>,
        name: Option<String>,
    },
    SearchParts {
        query: String,
    },
    ListFolders,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub run_id: RunId,
    pub ops: Vec<Operation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResult {
    pub op_id: OpId,
    pub created_part_ids: Vec<PartId>,
    pub changed_part_ids: Vec<PartId>,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub run_id: RunId,
    pub op: Operation,
    pub result: OpResult,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    Unsupported,
    Io,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for EngineError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_operations: Vec<String>,
    pub supported_import_formats: Vec<String>,
    pub deterministic_operation_log: bool,
}

pub trait Engine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError>;
    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError>;
    fn snapshot(&self) -> &LibraryState;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MocloEngine {
    state: LibraryState,
    journal: Vec<OperationRecord>,
    op_counter: u64,
}

fn to_data<T: Serialize>(value: &T) -> Result<serde_json::Value, EngineError> {
    serde_json::to_value(value).map_err(|e| EngineError {
        code: ErrorCode::Internal,
        message: format!("Could not serialize result: {e}"),
    })
}

impl MocloEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LibraryState) -> Self {
        let mut ret = Self {
            state,
            ..Self::default()
        };
        ret.state.store.seed_default_folders();
        ret
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LibraryState {
        &mut self.state
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            protocol_version: "v1".to_string(),
            supported_operations: vec![
                "FindSites".to_string(),
                "AnalyzeSequence".to_string(),
                "FindInsertRegions".to_string(),
                "ValidateOverhangs".to_string(),
                "AnalyzePartCompatibility".to_string(),
                "GenerateAssemblyReaction".to_string(),
                "SuggestOptimalOverhangs".to_string(),
                "ImportFile".to_string(),
                "ImportFolder".to_string(),
                "AddPart".to_string(),
                "UpdatePart".to_string(),
                "DeletePart".to_string(),
                "DeleteParts".to_string(),
                "MoveParts".to_string(),
                "CreateFolder".to_string(),
                "UpdateFolder".to_string(),
                "DeleteFolder".to_string(),
                "LoadSampleData".to_string(),
                "ListParts".to_string(),
                "GetPart".to_string(),
                "SearchParts".to_string(),
                "ListFolders".to_string(),
            ],
            supported_import_formats: vec![
                "Fasta".to_string(),
                "GenBank".to_string(),
                "PlainText".to_string(),
            ],
            deterministic_operation_log: true,
        }
    }

    pub fn operation_log(&self) -> &[OperationRecord] {
        &self.journal
    }

    fn next_op_id(&mut self) -> OpId {
        self.op_counter += 1;
        format!("op-{}", self.op_counter)
    }

    fn derive_part_id(filename: &str) -> PartId {
        Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "part".to_string())
    }

    fn derive_folder_id(name: &str) -> String {
        let mut slug = String::new();
        for c in name.to_lowercase().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c);
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_matches('-').to_string();
        if slug.is_empty() {
            "folder".to_string()
        } else {
            slug
        }
    }

    fn now_unix_ms() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn unique_part_id(&self, base: &str) -> PartId {
        if self.state.store.get_by_id(base).is_none() {
            return base.to_string();
        }
        let mut i = 2usize;
        loop {
            let candidate = format!("{base}_{i}");
            if self.state.store.get_by_id(&candidate).is_none() {
                return candidate;
            }
            i += 1;
        }
    }

    /// Shared import pipeline: extract the sequence, pick a unique id,
    /// analyze and store. Extraction failures become warnings, not
    /// errors, so one bad file never aborts a batch.
    fn import_file_record(
        &mut self,
        file: &ImportedFile,
        folder: Option<&str>,
        as_id: Option<&str>,
    ) -> (PartId, Vec<String>) {
        let extracted = extract_sequence(&file.content, &file.filename);
        let stem = Self::derive_part_id(&file.filename);
        let base = as_id.map(|s| s.to_string()).unwrap_or_else(|| stem.clone());
        let part_id = self.unique_part_id(&base);

        let mut warnings = vec![];
        if extracted.sequence.is_empty() {
            warnings.push(format!(
                "No sequence found in '{}': {}",
                file.filename, extracted.description
            ));
        }

        let mut part = Part::new(&part_id, &stem, &extracted.sequence);
        part.description = if extracted.description.is_empty() {
            format!("Imported from {}", file.filename)
        } else {
            extracted.description
        };
        part.folder = folder.map(|f| f.to_string());
        part.refresh_analysis();
        part.added_at = Self::now_unix_ms();
        self.state.store.upsert(part);
        (part_id, warnings)
    }

    /// The two MoClo vectors shipped as demonstration data. They are
    /// re-analyzed on load so sites and inserts reflect the catalog.
    fn sample_parts() -> Vec<Part> {
        let mut entry = Part::new(
            "pICH41021",
            "pICH41021",
            "GGTCTCAAGCCGTAGCTCTCAGGAATTCGATATCAAGCTTATCGATACCGTCGACCTCGAGGCATGCAAGCTTGGTACCGAGCTCGGATCCCACTAGTGACGTCGACAGCGGCCGCAAATTAAAGCCTTCGAGCGTCCCAAAACCTTCTCAAG",
        );
        entry.description = "MoClo Level 0 Entry Vector".to_string();
        entry.level = 0;
        entry.part_type = "entry_vector".to_string();
        entry.features = vec![
            PartFeature {
                name: "BsaI site".to_string(),
                kind: "restriction_site".to_string(),
                start: 7,
                end: 12,
                strand: Strand::Forward,
                color: None,
            },
            PartFeature {
                name: "BsaI site".to_string(),
                kind: "restriction_site".to_string(),
                start: 140,
                end: 145,
                strand: Strand::Forward,
                color: None,
            },
        ];

        let mut acceptor = Part::new(
            "pICH41308",
            "pICH41308",
            "GGTCTCAGGAGGTAGAAAATGAAACAAATCAGCGAAATGCAGATTCAATTAGCGTCTCAGTGACGTCAGCGGCCGCAAATTAAAGCCTTCGAGCGTCCCAAAACCTTCTCAAGAGATCCCTATAGACTAGTGTAGTATATCGACCGGATCC",
        );
        acceptor.description = "MoClo Level 1 Acceptor Vector".to_string();
        acceptor.level = 1;
        acceptor.part_type = "acceptor_vector".to_string();
        acceptor.features = vec![
            PartFeature {
                name: "BsaI site".to_string(),
                kind: "restriction_site".to_string(),
                start: 7,
                end: 12,
                strand: Strand::Forward,
                color: None,
            },
            PartFeature {
                name: "BsaI site".to_string(),
                kind: "restriction_site".to_string(),
                start: 135,
                end: 140,
                strand: Strand::Forward,
                color: None,
            },
        ];

        vec![entry, acceptor]
    }

    fn resolve_parts(&self, part_ids: &[PartId]) -> Result<Vec<Part>, EngineError> {
        let mut parts = Vec::with_capacity(part_ids.len());
        for part_id in part_ids {
            let part = self
                .state
                .store
                .get_by_id(part_id)
                .ok_or_else(|| EngineError {
                    code: ErrorCode::NotFound,
                    message: format!("Part '{part_id}' not found"),
                })?;
            parts.push(part.clone());
        }
        Ok(parts)
    }

    fn apply_internal(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        self.state.store.seed_default_folders();
        let op_id = self.next_op_id();
        let mut result = OpResult {
            op_id,
            created_part_ids: vec![],
            changed_part_ids: vec![],
            warnings: vec![],
            messages: vec![],
            data: None,
        };

        match op {
            Operation::FindSites { sequence, enzyme } => {
                let entry = ENZYMES.by_name(&enzyme).ok_or_else(|| EngineError {
                    code: ErrorCode::NotFound,
                    message: format!("Enzyme '{enzyme}' is not in the catalog"),
                })?;
                let sites = entry.find_sites(&sequence);
                result
                    .messages
                    .push(format!("Found {} {} sites", sites.len(), entry.name));
                result.data = Some(to_data(&sites)?);
            }
            Operation::AnalyzeSequence { sequence } => {
                let analysis = analyze_sequence(&sequence);
                result
                    .warnings
                    .extend(analysis.validation.conflicts.iter().cloned());
                result
                    .warnings
                    .extend(analysis.validation.warnings.iter().cloned());
                result.messages.push(format!(
                    "Analyzed {} bases against {} enzymes",
                    sequence.len(),
                    analysis.sites.len()
                ));
                result.data = Some(to_data(&analysis)?);
            }
            Operation::FindInsertRegions { sequence, enzyme } => {
                let name = enzyme.unwrap_or_else(|| DEFAULT_ASSEMBLY_ENZYME.to_string());
                let entry = ENZYMES.by_name(&name).ok_or_else(|| EngineError {
                    code: ErrorCode::NotFound,
                    message: format!("Enzyme '{name}' is not in the catalog"),
                })?;
                let regions = find_insert_regions(&sequence, entry);
                result.messages.push(format!(
                    "Found {} insert regions between {} sites",
                    regions.len(),
                    entry.name
                ));
                result.data = Some(to_data(&regions)?);
            }
            Operation::ValidateOverhangs { overhangs } => {
                let verdict = validate_overhangs(&overhangs);
                result.warnings.extend(verdict.conflicts.iter().cloned());
                result.warnings.extend(verdict.warnings.iter().cloned());
                result.messages.push(if verdict.valid {
                    format!("{} overhangs are mutually compatible", overhangs.len())
                } else {
                    format!(
                        "{} conflicts among {} overhangs",
                        verdict.conflicts.len(),
                        overhangs.len()
                    )
                });
                result.data = Some(to_data(&verdict)?);
            }
            Operation::AnalyzePartCompatibility { part_ids } => {
                let parts = self.resolve_parts(&part_ids)?;
                let strategy = analyze_part_compatibility(&parts);
                result.warnings.extend(strategy.conflicts.iter().cloned());
                result.warnings.extend(strategy.warnings.iter().cloned());
                result.messages.push(format!(
                    "Designed a level {} strategy for {} parts ({} efficiency)",
                    strategy.level,
                    strategy.parts.len(),
                    strategy.efficiency
                ));
                result.data = Some(to_data(&strategy)?);
            }
            Operation::GenerateAssemblyReaction { part_ids, enzyme } => {
                let parts = self.resolve_parts(&part_ids)?;
                let enzyme = enzyme.unwrap_or_else(|| DEFAULT_ASSEMBLY_ENZYME.to_string());
                let strategy = analyze_part_compatibility(&parts);
                let reaction = generate_assembly_reaction(&strategy, &enzyme);
                result.warnings.extend(reaction.warnings.iter().cloned());
                result.messages.push(format!(
                    "Planned a {} reaction for {} parts ({} bp product)",
                    reaction.enzyme,
                    reaction.parts.len(),
                    reaction.expected_product.size
                ));
                result.data = Some(to_data(&reaction)?);
            }
            Operation::SuggestOptimalOverhangs { part_types, level } => {
                let level = level.unwrap_or(0);
                let suggestions = suggest_optimal_overhangs(&part_types, level);
                result.messages.push(format!(
                    "{} suggested overhang pairs for level {}",
                    suggestions.len(),
                    level
                ));
                result.data = Some(to_data(&suggestions)?);
            }
            Operation::ImportFile { path, as_id, folder } => {
                let file = read_file(Path::new(&path)).map_err(|e| EngineError {
                    code: ErrorCode::Io,
                    message: format!("Could not read '{path}': {e}"),
                })?;
                let (part_id, warnings) =
                    self.import_file_record(&file, folder.as_deref(), as_id.as_deref());
                result.warnings.extend(warnings);
                result
                    .messages
                    .push(format!("Imported '{}' as '{}'", file.filename, part_id));
                result.created_part_ids.push(part_id);
            }
            Operation::ImportFolder { path, folder } => {
                let import = read_folder(Path::new(&path)).map_err(|e| EngineError {
                    code: ErrorCode::Io,
                    message: format!("Could not read folder '{path}': {e}"),
                })?;
                if import.successful_files < import.total_files {
                    result.warnings.push(format!(
                        "{} of {} files could not be read",
                        import.total_files - import.successful_files,
                        import.total_files
                    ));
                }
                for file in &import.files {
                    let (part_id, warnings) =
                        self.import_file_record(file, folder.as_deref(), None);
                    result.warnings.extend(warnings);
                    result.created_part_ids.push(part_id);
                }
                result.messages.push(format!(
                    "Imported {} of {} files from '{}'",
                    result.created_part_ids.len(),
                    import.total_files,
                    import.folder_path
                ));
            }
            Operation::AddPart {
                id,
                name,
                sequence,
                description,
                part_type,
                level,
                folder,
            } => {
                let base = id.unwrap_or_else(|| name.clone());
                let part_id = self.unique_part_id(&base);
                let mut part = Part::new(&part_id, &name, &sequence);
                if let Some(description) = description {
                    part.description = description;
                }
                if let Some(part_type) = part_type {
                    part.part_type = part_type;
                }
                if let Some(level) = level {
                    part.level = level;
                }
                part.folder = folder;
                part.refresh_analysis();
                part.added_at = Self::now_unix_ms();
                self.state.store.upsert(part);
                result
                    .messages
                    .push(format!("Added part '{part_id}' ({} bp)", sequence.len()));
                result.created_part_ids.push(part_id);
            }
            Operation::UpdatePart {
                id,
                name,
                description,
                sequence,
                part_type,
                level,
                resistance,
                origin,
                folder,
            } => {
                let mut part = self
                    .state
                    .store
                    .get_by_id(&id)
                    .ok_or_else(|| EngineError {
                        code: ErrorCode::NotFound,
                        message: format!("Part '{id}' not found"),
                    })?
                    .clone();
                let mut reanalyze = false;
                if let Some(name) = name {
                    part.name = name;
                }
                if let Some(description) = description {
                    part.description = description;
                }
                if let Some(sequence) = sequence {
                    part.sequence = sequence;
                    reanalyze = true;
                }
                if let Some(part_type) = part_type {
                    part.part_type = part_type;
                }
                if let Some(level) = level {
                    part.level = level;
                }
                if let Some(resistance) = resistance {
                    part.resistance = Some(resistance);
                }
                if let Some(origin) = origin {
                    part.origin = Some(origin);
                }
                if let Some(folder) = folder {
                    part.folder = Some(folder);
                }
                if reanalyze {
                    part.refresh_analysis();
                }
                self.state.store.upsert(part);
                result.changed_part_ids.push(id.clone());
                result.messages.push(format!("Updated part '{id}'"));
            }
            Operation::DeletePart { id } => {
                if !self.state.store.delete(&id) {
                    return Err(EngineError {
                        code: ErrorCode::NotFound,
                        message: format!("Part '{id}' not found"),
                    });
                }
                result.changed_part_ids.push(id.clone());
                result.messages.push(format!("Deleted part '{id}'"));
            }
            Operation::DeleteParts { ids } => {
                let mut failed = 0usize;
                for id in &ids {
                    if self.state.store.delete(id) {
                        result.changed_part_ids.push(id.clone());
                    } else {
                        failed += 1;
                    }
                }
                if failed > 0 {
                    result
                        .warnings
                        .push(format!("{failed} parts were not found"));
                }
                let outcome = DeleteOutcome {
                    success: result.changed_part_ids.len(),
                    failed,
                };
                result
                    .messages
                    .push(format!("Deleted {} parts", outcome.success));
                result.data = Some(to_data(&outcome)?);
            }
            Operation::MoveParts { ids, folder_id } => {
                if self.state.store.get_folder(&folder_id).is_none() {
                    return Err(EngineError {
                        code: ErrorCode::NotFound,
                        message: format!("Folder '{folder_id}' not found"),
                    });
                }
                for id in &ids {
                    if self.state.store.move_records(std::slice::from_ref(id), &folder_id) == 1 {
                        result.changed_part_ids.push(id.clone());
                    }
                }
                let missing = ids.len() - result.changed_part_ids.len();
                if missing > 0 {
                    result
                        .warnings
                        .push(format!("{missing} parts were not found"));
                }
                result.messages.push(format!(
                    "Moved {} parts to '{}'",
                    result.changed_part_ids.len(),
                    folder_id
                ));
            }
            Operation::CreateFolder {
                id,
                name,
                description,
                color,
            } => {
                let folder_id = id.unwrap_or_else(|| Self::derive_folder_id(&name));
                let folder = Folder {
                    id: folder_id.clone(),
                    name,
                    description: description.unwrap_or_default(),
                    color: color.unwrap_or_else(|| "#6b7280".to_string()),
                    created_at: Self::now_unix_ms(),
                };
                if !self.state.store.create_folder(folder.clone()) {
                    return Err(EngineError {
                        code: ErrorCode::InvalidInput,
                        message: format!(
                            "Folder id '{}' or name '{}' already exists",
                            folder.id, folder.name
                        ),
                    });
                }
                result
                    .messages
                    .push(format!("Created folder '{folder_id}'"));
                result.data = Some(to_data(&folder)?);
            }
            Operation::UpdateFolder {
                id,
                name,
                description,
                color,
            } => {
                let mut folder = self
                    .state
                    .store
                    .get_folder(&id)
                    .ok_or_else(|| EngineError {
                        code: ErrorCode::NotFound,
                        message: format!("Folder '{id}' not found"),
                    })?
                    .clone();
                if let Some(name) = name {
                    folder.name = name;
                }
                if let Some(description) = description {
                    folder.description = description;
                }
                if let Some(color) = color {
                    folder.color = color;
                }
                self.state.store.update_folder(folder.clone());
                result.messages.push(format!("Updated folder '{id}'"));
                result.data = Some(to_data(&folder)?);
            }
            Operation::DeleteFolder { id, move_to } => {
                if id == DEFAULT_FOLDER_ID {
                    return Err(EngineError {
                        code: ErrorCode::InvalidInput,
                        message: "The default folder cannot be deleted".to_string(),
                    });
                }
                if self.state.store.get_folder(&id).is_none() {
                    return Err(EngineError {
                        code: ErrorCode::NotFound,
                        message: format!("Folder '{id}' not found"),
                    });
                }
                let target = move_to.unwrap_or_else(|| DEFAULT_FOLDER_ID.to_string());
                if self.state.store.get_folder(&target).is_none() {
                    return Err(EngineError {
                        code: ErrorCode::NotFound,
                        message: format!("Folder '{target}' not found"),
                    });
                }
                self.state.store.delete_folder(&id, Some(&target));
                result.messages.push(format!(
                    "Deleted folder '{id}', parts moved to '{target}'"
                ));
            }
            Operation::LoadSampleData => {
                for mut part in Self::sample_parts() {
                    part.refresh_analysis();
                    part.added_at = Self::now_unix_ms();
                    let part_id = part.id.clone();
                    self.state.store.upsert(part);
                    result.created_part_ids.push(part_id);
                }
                result.messages.push(format!(
                    "Loaded {} sample parts",
                    result.created_part_ids.len()
                ));
            }
            Operation::ListParts { folder } => {
                let parts = self.state.store.list_by_folder(folder.as_deref());
                result.messages.push(format!("{} parts", parts.len()));
                result.data = Some(to_data(&parts)?);
            }
            Operation::GetPart { id, name } => {
                let part = match (&id, &name) {
                    (Some(id), _) => {
                        self.state.store.get_by_id(id).ok_or_else(|| EngineError {
                            code: ErrorCode::NotFound,
                            message: format!("Part '{id}' not found"),
                        })?
                    }
                    (None, Some(name)) => {
                        self.state
                            .store
                            .get_by_name(name)
                            .ok_or_else(|| EngineError {
                                code: ErrorCode::NotFound,
                                message: format!("No part named '{name}'"),
                            })?
                    }
                    (None, None) => {
                        return Err(EngineError {
                            code: ErrorCode::InvalidInput,
                            message: "GetPart needs an id or a name".to_string(),
                        });
                    }
                };
                result.messages.push(format!("Found part '{}'", part.id));
                result.data = Some(to_data(part)?);
            }
            Operation::SearchParts { query } => {
                let hits = self.state.store.search(&query);
                result
                    .messages
                    .push(format!("{} parts match '{}'", hits.len(), query));
                result.data = Some(to_data(&hits)?);
            }
            Operation::ListFolders => {
                let folders = self.state.store.list_folders();
                result.messages.push(format!("{} folders", folders.len()));
                result.data = Some(to_data(&folders)?);
            }
        }

        Ok(result)
    }
}

impl Engine for MocloEngine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let run_id = "interactive".to_string();
        let result = self.apply_internal(op.clone())?;
        self.journal.push(OperationRecord {
            run_id,
            op,
            result: result.clone(),
        });
        Ok(result)
    }

    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError> {
        let mut results = Vec::new();
        for op in &wf.ops {
            let result = self.apply_internal(op.clone())?;
            self.journal.push(OperationRecord {
                run_id: wf.run_id.clone(),
                op: op.clone(),
                result: result.clone(),
            });
            results.push(result);
        }
        Ok(results)
    }

    fn snapshot(&self) -> &LibraryState {
        &self.state
    }
}
