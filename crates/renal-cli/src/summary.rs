use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use renal_cli::pipeline::{Inspection, RunResult};
use renal_core::PatientAnalysis;
use renal_model::{Exclusion, Threshold};

pub fn print_run_summary(result: &RunResult) {
    let summary = &result.summary;
    println!("Input: {}", summary.input);
    if result.dry_run {
        println!("Dry run: no files written");
    } else {
        println!("Output: {}", result.output_dir.display());
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Measure"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Patients read"),
        Cell::new(summary.patients_read),
    ]);
    table.add_row(vec![
        Cell::new("Patients processed"),
        Cell::new(summary.patients_processed),
    ]);
    table.add_row(vec![
        Cell::new("Patients excluded"),
        count_cell(summary.patients_excluded, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Rows skipped"),
        count_cell(summary.skipped_rows, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("AKI episodes"),
        Cell::new(summary.aki_episodes),
    ]);
    table.add_row(vec![
        Cell::new("  of which AKD"),
        Cell::new(summary.akd_episodes),
    ]);
    table.add_row(vec![
        Cell::new("Sustained eGFR episodes"),
        Cell::new(summary.ckd_episodes),
    ]);
    for threshold in Threshold::ALL {
        let count = summary
            .progression
            .get(&threshold.label())
            .copied()
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(format!("Progression {threshold}")),
            count_cell(count, Color::Cyan),
        ]);
    }
    println!("{table}");

    if !result.output.excluded.is_empty() {
        print_exclusions(&result.output.excluded);
    }
    for path in &result.written {
        println!("  {}", path.display());
    }
}

fn print_exclusions(excluded: &[Exclusion]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Patient"), header_cell("Reason")]);
    apply_table_style(&mut table);
    for exclusion in excluded {
        table.add_row(vec![
            Cell::new(exclusion.patient_id.as_str()),
            Cell::new(exclusion.reason.to_string()).fg(Color::Yellow),
        ]);
    }
    println!();
    println!("Excluded patients:");
    println!("{table}");
}

pub fn print_inspection(inspection: &Inspection) {
    match inspection {
        Inspection::Excluded(exclusion) => {
            println!(
                "Patient {} is excluded: {}",
                exclusion.patient_id, exclusion.reason
            );
        }
        Inspection::Analyzed(analysis) => print_analysis(analysis),
    }
}

fn print_analysis(analysis: &PatientAnalysis) {
    let grid = &analysis.grid;
    println!("Patient: {}", grid.patient_id);
    println!("Baseline date: {}", grid.baseline_date);
    println!(
        "Baseline creatinine: {}",
        number(grid.baseline_creatinine)
    );

    let mut table = Table::new();
    let mut header = vec![
        header_cell("Day"),
        header_cell("Date"),
        header_cell("Creatinine"),
        header_cell("eGFR"),
        header_cell("48h ref"),
        header_cell("7d ref"),
        header_cell("Median ref"),
        header_cell("AKI"),
    ];
    header.extend(Threshold::ALL.map(|t| header_cell(&format!("<{}", t.label()))));
    table.set_header(header);
    apply_table_style(&mut table);
    for idx in 0..table.column_count() {
        if idx != 1 {
            align_column(&mut table, idx, CellAlignment::Right);
        }
    }

    for (idx, point) in grid.points.iter().enumerate() {
        if !point.is_observed() {
            continue;
        }
        let refs = &analysis.references[idx];
        let mut row = vec![
            Cell::new(point.days_since_baseline),
            Cell::new(point.date),
            Cell::new(number(point.creatinine)),
            Cell::new(number(point.egfr)),
            dim_or_value(refs.rise_reference()),
            dim_or_value(refs.ratio_7d_reference()),
            dim_or_value(refs.median_pre_365d),
            flag_cell(analysis.flags.aki[idx], Color::Red),
        ];
        row.extend(
            Threshold::ALL.map(|t| flag_cell(analysis.flags.egfr(t)[idx], Color::Magenta)),
        );
        table.add_row(row);
    }
    println!("{table}");

    let result = &analysis.result;
    let mut episodes = Table::new();
    episodes.set_header(vec![
        header_cell("Kind"),
        header_cell("Start"),
        header_cell("Stop"),
        header_cell("Start day"),
        header_cell("Stop day"),
        header_cell("Days"),
    ]);
    apply_table_style(&mut episodes);
    for aki in &result.aki_episodes {
        let kind = if aki.is_akd { "AKD" } else { "AKI" };
        episodes.add_row(episode_row(kind, &aki.episode));
    }
    for ckd in &result.ckd_episodes {
        let kind = ckd
            .threshold()
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        episodes.add_row(episode_row(&kind, ckd));
    }
    println!();
    println!("Episodes:");
    println!("{episodes}");

    let progression = &result.progression;
    println!();
    println!(
        "Follow-up: {} days, last 6 months eGFR {}, last 12 months eGFR {}",
        progression.max_follow_up_days,
        number(progression.last_6_months),
        number(progression.last_12_months)
    );
    for t in &progression.thresholds {
        println!(
            "  {}: sustained={} under={} progression={} person-time={}",
            t.threshold,
            u8::from(t.sustained_90day),
            u8::from(t.follow_up_under),
            u8::from(t.progression),
            t.person_time_days
        );
    }
}

fn episode_row(kind: &str, episode: &renal_model::Episode) -> Vec<Cell> {
    vec![
        Cell::new(kind).add_attribute(Attribute::Bold),
        Cell::new(episode.start_date),
        Cell::new(episode.stop_date),
        Cell::new(episode.start_offset_days),
        Cell::new(episode.stop_offset_days),
        Cell::new(episode.duration_days),
    ]
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

fn dim_or_value(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::new(format!("{v:.1}")),
        None => dim_cell("-"),
    }
}

fn flag_cell(flag: Option<bool>, color: Color) -> Cell {
    match flag {
        Some(true) => Cell::new("1").fg(color).add_attribute(Attribute::Bold),
        Some(false) => dim_cell("0"),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}
