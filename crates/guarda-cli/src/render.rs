//! Saída em texto para o terminal

use guarda_core::{Department, ItemRecord, ItemStatus, LedgerStats};
use std::io::{self, Write};

pub fn status_label(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Stored => "guardado",
        ItemStatus::PickedUp => "entregue",
        ItemStatus::Archived => "arquivado",
    }
}

pub fn item_line(item: &ItemRecord) -> String {
    format!(
        "{:<37} {:<28} {:<9} {:<9} {} ({}, {})",
        item.id,
        item.qr_code,
        status_label(item.status),
        item.department,
        item.item_name,
        item.owner_name(),
        item.phone
    )
}

pub fn items(out: &mut impl Write, items: &[&ItemRecord]) -> io::Result<()> {
    let stored = items
        .iter()
        .filter(|item| item.status == ItemStatus::Stored)
        .count();
    writeln!(out, "Itens: {} (guardados agora: {})", items.len(), stored)?;

    if items.is_empty() {
        writeln!(out, "Nenhum item por aqui ainda.")?;
        return Ok(());
    }

    for item in items {
        writeln!(out, "- {}", item_line(item))?;
    }
    Ok(())
}

pub fn record(out: &mut impl Write, headline: &str, item: &ItemRecord) -> io::Result<()> {
    writeln!(out, "{headline}")?;
    writeln!(out, "  ID:       {}", item.id)?;
    writeln!(out, "  QR:       {}", item.qr_code)?;
    writeln!(out, "  Item:     {} ({})", item.item_name, item.department)?;
    writeln!(out, "  Dono:     {} • {}", item.owner_name(), item.phone)?;
    writeln!(out, "  Estado:   {}", status_label(item.status))?;
    if let Some(at) = item.picked_up_at {
        writeln!(out, "  Entregue: {}", at.to_rfc3339())?;
    }
    if let Some(at) = item.archived_at {
        writeln!(out, "  Arquivado: {}", at.to_rfc3339())?;
    }
    Ok(())
}

pub fn stats(out: &mut impl Write, stats: &LedgerStats) -> io::Result<()> {
    writeln!(out, "Ocupação por departamento:")?;
    writeln!(out, "─────────────────────────────────────")?;
    for load in &stats.departments {
        let marker = if load.is_full() { "  (lotado)" } else { "" };
        writeln!(
            out,
            "{:<10} {:>4} / {}{}",
            load.department, load.stored, load.ceiling, marker
        )?;
    }
    writeln!(out, "─────────────────────────────────────")?;
    writeln!(
        out,
        "Guardados: {}   Total registrado: {}",
        stats.total_stored, stats.total_items
    )
}

pub fn departments(out: &mut impl Write) -> io::Result<()> {
    for department in Department::ALL {
        writeln!(out, "- {:<10} limite: {}", department, department.ceiling())?;
    }
    Ok(())
}
