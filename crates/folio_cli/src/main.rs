//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `folio_core` linkage with a deterministic probe.
//! - Load `FolioConfig` from the JSON file named by `FOLIO_CONFIG`, or use
//!   defaults (in-memory store, `uploads/` assets, no file logging).
//! - Optionally run a scripted edit:
//!   - `folio_cli <record_id> <section text> [cover image file]`
//!   - `folio_cli page <main|footer> <tab> <text>`

use folio_core::model::page::{parse_page_tab, parse_text_slot};
use folio_core::{
    AssetTarget, BlockType, CatalogService, DetailService, FolioConfig, PageService, Record,
    RecordId, SqlitePageRepository, SqliteRecordRepository, StaticAuth,
};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "usage: folio_cli <record_id> <section text> [cover image file]
       folio_cli page <main|footer> <tab> <text>";

fn main() -> ExitCode {
    println!("folio_core ping={}", folio_core::ping());
    println!("folio_core version={}", folio_core::core_version());

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = config.init_logging() {
        eprintln!("warning: {err}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        return ExitCode::SUCCESS;
    }
    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<FolioConfig, Box<dyn Error>> {
    match std::env::var_os("FOLIO_CONFIG") {
        Some(path) => Ok(FolioConfig::from_path(path)?),
        None => Ok(FolioConfig::default()),
    }
}

fn run(config: &FolioConfig, args: &[String]) -> Result<(), Box<dyn Error>> {
    let conn = config.open_database()?;
    match args {
        [command, slot, tab, text] if command == "page" => run_page_edit(&conn, slot, tab, text),
        [id, text] => run_record_edit(config, &conn, id, text, None),
        [id, text, cover] => run_record_edit(config, &conn, id, text, Some(Path::new(cover))),
        _ => Err(USAGE.into()),
    }
}

fn run_record_edit(
    config: &FolioConfig,
    conn: &Connection,
    id: &str,
    text: &str,
    cover: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let id: RecordId = id.parse()?;
    let repo = SqliteRecordRepository::try_new(conn)?;
    let detail = DetailService::new(&repo);

    let mut session = detail.open_session(id, StaticAuth::operator())?;
    if session.committed().is_none() {
        let mut record = Record::new(id)?;
        record.title = format!("Record {id}");
        detail.create(&record)?;
        session = detail.open_session(id, StaticAuth::operator())?;
        println!("created record_id={id}");
    }

    session.start_edit()?;
    let index = session.append_section(BlockType::Text)?.sections.len() - 1;
    session.set_section_content(index, text)?;
    if let Some(cover) = cover {
        let bytes = std::fs::read(cover)?;
        let file_name = cover
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let asset =
            session.attach_asset(&config.asset_store(), AssetTarget::Image, file_name, &bytes)?;
        println!("uploaded cover={}", asset.url);
    }
    let saved = detail.save(&mut session)?;
    info!(
        "event=cli_edit module=cli status=ok record_id={} sections={}",
        saved.id(),
        saved.sections.len()
    );
    println!("saved record_id={} sections={}", saved.id(), saved.sections.len());

    for (group, entries) in CatalogService::new(&repo).grouped()? {
        println!("group={group} entries={}", entries.len());
    }
    Ok(())
}

fn run_page_edit(
    conn: &Connection,
    slot: &str,
    tab: &str,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    let slot = parse_text_slot(slot)?;
    let tab = parse_page_tab(tab)?;
    let pages = PageService::new(SqlitePageRepository::try_new(conn)?);

    let mut session = pages.open_text(slot, tab, StaticAuth::operator())?;
    session.start_edit()?;
    session.set_text(text)?;
    pages.save(&mut session)?;
    info!(
        "event=cli_page_edit module=cli status=ok slot={} tab={tab}",
        slot.as_str()
    );

    for (tab, content) in pages.texts(slot)? {
        println!("{}.{tab} chars={}", slot.as_str(), content.chars().count());
    }
    Ok(())
}
