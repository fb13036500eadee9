use moclo_designer::engine::{Engine, LibraryState, MocloEngine, Operation, Workflow};
use serde::Serialize;
use std::{env, fs};

const DEFAULT_STATE_PATH: &str = ".moclo_state.json";

#[derive(Serialize)]
struct PartSummary {
    id: String,
    name: String,
    size: usize,
    part_type: String,
    folder: String,
    sites: usize,
}

#[derive(Serialize)]
struct LibrarySummary {
    part_count: usize,
    folder_count: usize,
    parts: Vec<PartSummary>,
    folders: Vec<String>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  moclo_cli --version\n  \
  moclo_cli [--state PATH] capabilities\n  \
  moclo_cli [--state PATH] op '<operation-json>'\n  \
  moclo_cli [--state PATH] workflow '<workflow-json>'\n  \
  moclo_cli [--state PATH] state-summary\n  \
  moclo_cli [--state PATH] export-state PATH\n  \
  moclo_cli [--state PATH] import-state PATH\n  \
  moclo_cli [--state PATH] find-sites ENZYME SEQUENCE\n  \
  moclo_cli [--state PATH] analyze SEQUENCE\n  \
  moclo_cli [--state PATH] inserts SEQUENCE [ENZYME]\n  \
  moclo_cli [--state PATH] validate OVERHANG [OVERHANG...]\n  \
  moclo_cli [--state PATH] design PART_ID [PART_ID...]\n  \
  moclo_cli [--state PATH] reaction PART_ID [PART_ID...]\n  \
  moclo_cli [--state PATH] suggest LEVEL\n  \
  moclo_cli [--state PATH] import FILE [FOLDER_ID]\n  \
  moclo_cli [--state PATH] import-folder DIR [FOLDER_ID]\n  \
  moclo_cli [--state PATH] sample-data\n  \
  moclo_cli [--state PATH] list [FOLDER_ID]\n  \
  moclo_cli [--state PATH] get PART_ID\n  \
  moclo_cli [--state PATH] search QUERY\n  \
  moclo_cli [--state PATH] folders\n\n  \
  Tip: pass @file.json instead of inline JSON"
    );
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn load_state(path: &str) -> Result<LibraryState, String> {
    if std::path::Path::new(path).exists() {
        LibraryState::load_from_path(path).map_err(|e| e.to_string())
    } else {
        Ok(LibraryState::default())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_global_state_arg(args: &[String]) -> (String, usize) {
    if args.len() >= 3 && args[1] == "--state" {
        return (args[2].clone(), 3);
    }
    (DEFAULT_STATE_PATH.to_string(), 1)
}

fn summarize_library(engine: &MocloEngine) -> LibrarySummary {
    let mut parts: Vec<PartSummary> = engine
        .state()
        .store
        .get_all()
        .iter()
        .map(|part| PartSummary {
            id: part.id.clone(),
            name: part.name.clone(),
            size: part.size,
            part_type: part.part_type.clone(),
            folder: part.folder_or_default().to_string(),
            sites: part.sites.len(),
        })
        .collect();
    parts.sort_by(|a, b| a.id.cmp(&b.id));

    let folders = engine
        .state()
        .store
        .list_folders()
        .iter()
        .map(|folder| folder.id.clone())
        .collect();

    LibrarySummary {
        part_count: parts.len(),
        folder_count: engine.state().store.folder_count(),
        parts,
        folders,
    }
}

/// Runs one operation against the persisted library and writes the
/// library back, so every subcommand leaves a consistent state file.
fn apply_and_save(state_path: &str, op: Operation) -> Result<(), String> {
    let mut engine = MocloEngine::from_state(load_state(state_path)?);
    let result = engine.apply(op).map_err(|e| e.to_string())?;
    engine
        .state()
        .save_to_path(state_path)
        .map_err(|e| e.to_string())?;
    print_json(&result)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!(
            "moclo_cli {}\nGolden Gate / MoClo assembly toolkit",
            env!("CARGO_PKG_VERSION")
        );
        return Ok(());
    }

    let (state_path, cmd_idx) = parse_global_state_arg(&args);
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }

    let command = &args[cmd_idx];

    match command.as_str() {
        "capabilities" => {
            print_json(&MocloEngine::capabilities())?;
            Ok(())
        }
        "import-state" | "load-library" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err(format!("Missing path for {command}"));
            }
            let source = &args[cmd_idx + 1];
            let state = LibraryState::load_from_path(source).map_err(|e| e.to_string())?;
            state.save_to_path(&state_path).map_err(|e| e.to_string())?;
            println!("Loaded library from '{source}' into '{state_path}'");
            Ok(())
        }
        "export-state" | "save-library" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err(format!("Missing path for {command}"));
            }
            let target = &args[cmd_idx + 1];
            let state = load_state(&state_path)?;
            state.save_to_path(target).map_err(|e| e.to_string())?;
            println!("Saved library from '{state_path}' to '{target}'");
            Ok(())
        }
        "state-summary" => {
            let state = load_state(&state_path)?;
            let engine = MocloEngine::from_state(state);
            print_json(&summarize_library(&engine))
        }
        "find-sites" => {
            if args.len() <= cmd_idx + 2 {
                usage();
                return Err("find-sites requires: ENZYME SEQUENCE".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::FindSites {
                    sequence: args[cmd_idx + 2].clone(),
                    enzyme: args[cmd_idx + 1].clone(),
                },
            )
        }
        "analyze" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("analyze requires a sequence".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::AnalyzeSequence {
                    sequence: args[cmd_idx + 1].clone(),
                },
            )
        }
        "inserts" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("inserts requires a sequence".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::FindInsertRegions {
                    sequence: args[cmd_idx + 1].clone(),
                    enzyme: args.get(cmd_idx + 2).cloned(),
                },
            )
        }
        "validate" => {
            let overhangs: Vec<String> = args[cmd_idx + 1..].to_vec();
            if overhangs.is_empty() {
                usage();
                return Err("validate requires at least one overhang".to_string());
            }
            apply_and_save(&state_path, Operation::ValidateOverhangs { overhangs })
        }
        "design" => {
            let part_ids: Vec<String> = args[cmd_idx + 1..].to_vec();
            if part_ids.is_empty() {
                usage();
                return Err("design requires at least one part id".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::AnalyzePartCompatibility { part_ids },
            )
        }
        "reaction" => {
            let part_ids: Vec<String> = args[cmd_idx + 1..].to_vec();
            if part_ids.is_empty() {
                usage();
                return Err("reaction requires at least one part id".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::GenerateAssemblyReaction {
                    part_ids,
                    enzyme: None,
                },
            )
        }
        "suggest" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("suggest requires a level".to_string());
            }
            let level: u8 = args[cmd_idx + 1]
                .parse()
                .map_err(|e| format!("Invalid level '{}': {e}", args[cmd_idx + 1]))?;
            apply_and_save(
                &state_path,
                Operation::SuggestOptimalOverhangs {
                    part_types: vec![],
                    level: Some(level),
                },
            )
        }
        "import" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("import requires a file path".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::ImportFile {
                    path: args[cmd_idx + 1].clone(),
                    as_id: None,
                    folder: args.get(cmd_idx + 2).cloned(),
                },
            )
        }
        "import-folder" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("import-folder requires a directory path".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::ImportFolder {
                    path: args[cmd_idx + 1].clone(),
                    folder: args.get(cmd_idx + 2).cloned(),
                },
            )
        }
        "sample-data" => apply_and_save(&state_path, Operation::LoadSampleData),
        "list" => apply_and_save(
            &state_path,
            Operation::ListParts {
                folder: args.get(cmd_idx + 1).cloned(),
            },
        ),
        "get" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("get requires a part id".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::GetPart {
                    id: Some(args[cmd_idx + 1].clone()),
                    name: None,
                },
            )
        }
        "search" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("search requires a query".to_string());
            }
            apply_and_save(
                &state_path,
                Operation::SearchParts {
                    query: args[cmd_idx + 1].clone(),
                },
            )
        }
        "folders" => apply_and_save(&state_path, Operation::ListFolders),
        "op" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("Missing operation JSON".to_string());
            }
            let json = load_json_arg(&args[cmd_idx + 1])?;
            let op: Operation =
                serde_json::from_str(&json).map_err(|e| format!("Invalid operation JSON: {e}"))?;
            apply_and_save(&state_path, op)
        }
        "workflow" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("Missing workflow JSON".to_string());
            }
            let json = load_json_arg(&args[cmd_idx + 1])?;
            let workflow: Workflow =
                serde_json::from_str(&json).map_err(|e| format!("Invalid workflow JSON: {e}"))?;

            let mut engine = MocloEngine::from_state(load_state(&state_path)?);
            let results = engine.apply_workflow(workflow).map_err(|e| e.to_string())?;
            engine
                .state()
                .save_to_path(&state_path)
                .map_err(|e| e.to_string())?;
            print_json(&results)
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
