use dogpark_core::Region;
use dogpark_places::{MarkerEntry, SearchReport};
use serde::Serialize;

/// Everything a search prints.
#[derive(Debug, Serialize)]
pub(crate) struct SearchOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    pub notice: Option<&'static str>,
    pub report: SearchReport,
    pub markers: Vec<MarkerEntry>,
}

pub(crate) fn print_regions(regions: &[Region], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(regions)?);
    } else {
        print!("{}", regions_table(regions));
    }
    Ok(())
}

pub(crate) fn print_search(output: &SearchOutput, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else {
        print!("{}", search_table(output));
    }
    Ok(())
}

fn regions_table(regions: &[Region]) -> String {
    let header = format!("{:<20}{:<22}{:>9}{:>10}\n", "IDENTIFIER", "NAME", "LAT", "LNG");
    regions.iter().fold(header, |mut out, region| {
        out.push_str(&format!(
            "{:<20}{:<22}{:>9.4}{:>10.4}\n",
            region.identifier, region.name, region.latitude, region.longitude
        ));
        out
    })
}

fn search_table(output: &SearchOutput) -> String {
    let mut out = String::new();
    if let Some(region) = &output.region {
        out.push_str(&format!("Region: {} ({})\n", region.name, region.center()));
    }

    let report = &output.report;
    out.push_str(&format!(
        "Searched {:.0} m around {}: {} found, {} shown, {} skipped\n",
        report.area.radius_meters,
        report.area.center,
        report.places_found,
        report.markers_added,
        report.skipped.len()
    ));

    if let Some(notice) = output.notice {
        out.push_str(notice);
        out.push('\n');
        return out;
    }

    out.push_str(&format!(
        "{:<8}{:<9}{:<18}NAME\n",
        "RATING", "REVIEWS", "LOCATION"
    ));
    for marker in &output.markers {
        let rating = marker
            .average_rating
            .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
        let location = marker.location.to_string();
        out.push_str(&format!(
            "{:<8}{:<9}{:<18}{}\n",
            rating, marker.review_count, location, marker.title
        ));
    }
    out
}
