use crate::report::{KindSummary, RunSummary};

pub fn render_report_text(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("Category Score Report\n");
    out.push_str("=====================\n\n");
    out.push_str(&format!("Tool: {} {}\n", summary.tool, summary.version));
    out.push_str(&format!("Data directory: {}\n", summary.data_dir));

    for (idx, kind) in summary.kinds.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}\n", idx + 1, kind_title(kind)));
        render_kind(&mut out, kind);
    }

    out
}

fn kind_title(kind: &KindSummary) -> String {
    let label = kind.kind.label();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn render_kind(out: &mut String, kind: &KindSummary) {
    out.push_str(&format!("Input: {}\n", kind.primary_path));
    out.push_str(&format!("Output: {}\n", kind.output_file));
    out.push_str(&format!(
        "Rows loaded: {}, excluded: {}, dropped (completeness < {}): {}, scored: {}\n",
        kind.rows_loaded,
        kind.rows_excluded,
        format_num(kind.completeness_threshold),
        kind.dropped_incomplete,
        kind.scored
    ));
    if !kind.missing_auxiliary.is_empty() {
        out.push_str(&format!(
            "Missing auxiliary tables: {}\n",
            kind.missing_auxiliary.join(", ")
        ));
    }
    if !kind.missing_columns.is_empty() {
        out.push_str(&format!(
            "Missing columns: {}\n",
            kind.missing_columns.join(", ")
        ));
    }
    let degenerate: Vec<&str> = kind
        .metrics
        .iter()
        .filter(|m| m.degenerate)
        .map(|m| m.metric.as_str())
        .collect();
    if !degenerate.is_empty() {
        out.push_str(&format!(
            "Metrics without variation (scored 0.5): {}\n",
            degenerate.join(", ")
        ));
    }
    if kind.scored == 0 {
        out.push_str("No entity met the completeness threshold; the score table is empty.\n");
        return;
    }
    for cat in &kind.categories {
        out.push_str(&format!(
            "  {}: median {}, p10 {}, p90 {}, missing {}\n",
            cat.name,
            format_opt(cat.median),
            format_opt(cat.p10),
            format_opt(cat.p90),
            cat.missing
        ));
    }
}

fn format_num(v: f64) -> String {
    format!("{:.2}", v)
}

fn format_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format_num(v),
        None => "n/a".to_string(),
    }
}
