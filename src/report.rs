//! Console summaries for each command. Presentation only.

use crate::app::clean_use_case::CleanOutcome;
use crate::app::export_use_case::ExportOutcome;
use crate::pipeline::processing::coverage::CoverageReport;
use crate::pipeline::processing::verify::VerificationReport;
use crate::types::is_absent;

const RULE: &str = "================================================================================";
const FLAGGED_PREVIEW: usize = 5;

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if is_absent(value) {
        placeholder
    } else {
        value.trim()
    }
}

pub fn print_cleaning_report(outcome: &CleanOutcome) {
    let table = &outcome.normalized.table;
    let stats = &outcome.stats;

    println!("\n{}", RULE);
    println!("📊 CLEANING REPORT");
    println!("{}", RULE);
    println!("   Total records processed: {}", table.len());
    println!("   Records flagged: {}", stats.flagged_count);

    println!("\n🧹 Fields cleaned:");
    for (rule, count) in outcome.normalized.tally.entries() {
        println!("   {}: {}", rule, count);
    }

    println!("\n📁 Output files:");
    println!(
        "   {} ({} rows, sha256 {})",
        outcome.canonical.path.display(),
        table.len(),
        outcome.canonical.sha256
    );
    match &outcome.flagged {
        Some(flagged) => println!(
            "   {} ({} rows, sha256 {})",
            flagged.path.display(),
            stats.flagged_count,
            flagged.sha256
        ),
        None if outcome.stale_flagged_removed => {
            println!("   No records flagged; removed the flagged file from an earlier run")
        }
        None => println!("   No records flagged"),
    }

    if stats.flagged_count > 0 {
        println!("\n⚠️  First {} flagged providers:", FLAGGED_PREVIEW.min(stats.flagged_count));
        let flagged = table
            .records
            .iter()
            .zip(&outcome.assessments)
            .filter(|(_, assessment)| assessment.is_flagged())
            .take(FLAGGED_PREVIEW);
        for (i, (record, _)) in flagged.enumerate() {
            println!("   {}. {}", i + 1, record.display_name());
            println!("      Phone: {}", or_placeholder(&record.phone, "[MISSING]"));
            println!(
                "      Location: {}, {}",
                or_placeholder(&record.city, "[NO CITY]"),
                or_placeholder(&record.state, "[NO STATE]")
            );
        }
    }

    println!("\n📋 Data completeness:");
    println!("   Missing name: {}", stats.missing_name);
    println!("   Missing phone: {}", stats.missing_phone);
    println!("   Missing city: {}", stats.missing_city);
    println!("   Missing state: {}", stats.missing_state);
    println!(
        "   Complete records: {} ({:.1}%)",
        stats.complete_records,
        stats.completeness_rate()
    );
}

pub fn print_verification(report: &VerificationReport) {
    println!("\n🔍 Post-cleaning validation ({} records):", report.records_checked);
    if report.is_clean() {
        println!("   ✅ All cleaning rules hold");
        return;
    }
    for (violation, count) in &report.violations {
        println!("   ❌ {}: {} rows", violation, count);
    }
}

pub fn print_coverage(reports: &[CoverageReport], verbose: bool) {
    println!("\n{}", RULE);
    println!("📍 METRO COVERAGE");
    println!("{}", RULE);

    for report in reports {
        println!("\n   {}, {}: {} providers", report.city, report.state, report.total);
        println!(
            "      City-specific: {} (direct {}, service area {})",
            report.city_specific(),
            report.direct_city,
            report.service_area
        );
        println!("      Regional/statewide: {}", report.regional);
        println!("      Nationwide: {}", report.nationwide);
        println!("      Excluded (not mobile): {}", report.excluded);

        if verbose {
            for m in &report.matches {
                println!(
                    "         - {} ({}) [{}]",
                    m.name,
                    or_placeholder(&m.city, "[NO CITY]"),
                    m.outcome.label()
                );
            }
        }
    }

    let regional: usize = reports.iter().map(|r| r.regional).sum();
    if regional > 0 {
        println!(
            "\n⚠️  {} matches come from the statewide fallback only; they may overstate city coverage",
            regional
        );
    }
}

pub fn print_export(outcome: &ExportOutcome) {
    println!("\n📦 Exported {} providers", outcome.documents);
    println!(
        "   {} ({} bytes, sha256 {})",
        outcome.output.path.display(),
        outcome.output.bytes,
        outcome.output.sha256
    );
}
