//! Subcommand implementations.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use flatvec_core::{
    escape_identifier, offset_index_path, open_store, translate, BigEndianCodec,
    CloseableVectorStore, DiskSpaceGuard, DiskStatus, FlatvecConfig, ObjectVectorPair,
    StoreFormat, VectorCodec, VectorStore, VectorStoreReader, VectorStoreWriter,
};
use serde_json::json;

/// Picks a store format from the file name, or the configured default when
/// the name has no extension.
pub fn detect_format(path: &Path, config: &FlatvecConfig) -> StoreFormat {
    match path.extension() {
        Some(_) => StoreFormat::from_path(path),
        None => config.storage.default_format,
    }
}

pub fn info(path: &Path, format: StoreFormat, json: bool) -> anyhow::Result<()> {
    let store = open_store(path, format)
        .with_context(|| format!("Failed to open {} store {}", format, path.display()))?;
    let header = store.header().clone();
    let records = store.count()?;
    store.close();

    let record_bytes = BigEndianCodec.record_byte_size(header.vector_type(), header.dimension())?;
    let index_entries = match format {
        StoreFormat::Binary => std::fs::metadata(offset_index_path(path))
            .ok()
            .map(|m| m.len() / 8),
        StoreFormat::Text => None,
    };

    if json {
        let options: serde_json::Map<String, serde_json::Value> = header
            .options()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        let info = json!({
            "path": path,
            "format": format,
            "vector_type": header.vector_type(),
            "dimension": header.dimension(),
            "record_bytes": record_bytes,
            "records": records,
            "offset_index_entries": index_entries,
            "options": options,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{} {}", "Vector store:".bold(), path.display());
    println!("  Format:        {format}");
    println!("  Vector type:   {}", header.vector_type());
    println!("  Dimension:     {}", header.dimension());
    println!("  Record bytes:  {record_bytes}");
    println!("  Records:       {records}");
    match (format, index_entries) {
        (StoreFormat::Text, _) => {}
        (StoreFormat::Binary, Some(n)) if n == records as u64 => {
            println!("  Offset index:  {} entries", n.to_string().green());
        }
        (StoreFormat::Binary, Some(n)) => {
            println!(
                "  Offset index:  {} entries {}",
                n.to_string().yellow(),
                "(does not match record count)".yellow()
            );
        }
        (StoreFormat::Binary, None) => {
            println!("  Offset index:  {}", "none, lookups scan".dimmed());
        }
    }
    for (key, value) in header.options() {
        println!("  -{key} {value}");
    }
    Ok(())
}

pub fn lookup(
    path: &Path,
    format: StoreFormat,
    identifier: &str,
    scan: bool,
    json: bool,
    config: &FlatvecConfig,
) -> anyhow::Result<()> {
    let vector = match format {
        StoreFormat::Binary => {
            let reader = VectorStoreReader::open(path)
                .with_context(|| format!("Failed to open store {}", path.display()))?
                .with_buffer_size(config.storage.read_buffer_size);
            let found = if scan {
                reader.scan_for(identifier)?
            } else {
                reader.lookup(identifier)?
            };
            reader.close();
            found
        }
        StoreFormat::Text => {
            let store = open_store(path, format)
                .with_context(|| format!("Failed to open store {}", path.display()))?;
            let found = store.lookup(identifier)?;
            store.close();
            found
        }
    };

    let Some(vector) = vector else {
        bail!("Identifier '{}' not found in {}", identifier, path.display());
    };

    if json {
        let pair = ObjectVectorPair::new(identifier, vector);
        println!("{}", serde_json::to_string_pretty(&pair)?);
    } else {
        println!(
            "{}|{}",
            escape_identifier(identifier),
            BigEndianCodec.encode_text(&vector)
        );
    }
    Ok(())
}

pub fn dump(path: &Path, format: StoreFormat, limit: Option<usize>) -> anyhow::Result<()> {
    let store = open_store(path, format)
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for pair in store.enumerate().take(limit.unwrap_or(usize::MAX)) {
        let pair = pair?;
        writeln!(
            out,
            "{}|{}",
            escape_identifier(&pair.identifier),
            BigEndianCodec.encode_text(&pair.vector)
        )?;
    }
    out.flush()?;
    store.close();
    Ok(())
}

pub fn convert(
    input: &Path,
    from: StoreFormat,
    output: &Path,
    to: StoreFormat,
    config: &FlatvecConfig,
) -> anyhow::Result<()> {
    let writer = VectorStoreWriter::from_config(config);
    let summary = translate(input, from, output, to, &writer).with_context(|| {
        format!(
            "Failed to convert {} to {}",
            input.display(),
            output.display()
        )
    })?;

    println!("{}", "Conversion Summary".green().bold());
    println!("  Input:         {} ({from})", input.display());
    println!("  Output:        {} ({to})", output.display());
    println!("  Records:       {}", summary.records.to_string().green());
    println!("  Bytes:         {}", summary.bytes);
    if summary.index_entries > 0 {
        println!("  Index entries: {}", summary.index_entries);
    }
    println!("  Duration:      {} ms", summary.elapsed.as_millis());
    Ok(())
}

pub fn check_space(path: &Path, config: &FlatvecConfig) -> anyhow::Result<()> {
    let guard = DiskSpaceGuard::from_config(&config.disk);
    let status = guard.check(path)?;

    let (label, usable) = match status {
        DiskStatus::Healthy { usable } => ("OK".green().bold(), usable),
        DiskStatus::Low { usable } => ("LOW".yellow().bold(), usable),
    };
    println!(
        "{label} {} free at {} (hard limit {}, warning below {})",
        format_bytes(usable),
        path.display(),
        format_bytes(guard.hard_limit()),
        format_bytes(guard.soft_limit())
    );
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: u64) -> String {
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= GIB {
        format!("{:.2} GiB", b / GIB)
    } else {
        format!("{:.1} MiB", b / MIB)
    }
}
