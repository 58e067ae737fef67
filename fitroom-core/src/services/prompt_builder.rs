//! Prompt assembly for try-on generation.
//!
//! Pure string building: deterministic for identical input, no I/O.
//! Absent attributes are omitted outright, never rendered as "unknown".

use fitroom_common::models::profile::ModelProfile;
use fitroom_common::models::tryon::GarmentSnapshotEntry;

/// Builds the natural-language generation prompt from a profile snapshot
/// and the garments resolved for this submission.
pub fn build_tryon_prompt(profile: &ModelProfile, garments: &[GarmentSnapshotEntry]) -> String {
    let mut parts: Vec<String> = Vec::new();

    let mut subject = String::from("A full-body fashion photo of the person in the first image");
    if let Some(gender) = non_empty(&profile.gender) {
        subject.push_str(&format!(", a {} model", gender));
    }
    if let Some(age) = non_empty(&profile.age_stage) {
        subject.push_str(&format!(" in the {} age range", age));
    }
    subject.push('.');
    parts.push(subject);

    let mut build = Vec::new();
    if let Some(h) = profile.height_cm {
        build.push(format!("{}cm tall", h));
    }
    if let Some(w) = profile.weight_kg {
        build.push(format!("about {}kg", w));
    }
    if let Some(feature) = non_empty(&profile.body_feature) {
        build.push(format!("{} body shape", feature));
    }
    if !build.is_empty() {
        parts.push(format!("The model is {}.", build.join(", ")));
    }

    let slot_list = garments
        .iter()
        .map(|g| g.slot_type.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    parts.push(format!(
        "The model wears every garment shown in the remaining {} image(s): {}. \
         Keep each garment's color, pattern, cut and texture exactly as pictured.",
        garments.len(),
        slot_list
    ));

    if let Some(weather) = non_empty(&profile.suitable_weather) {
        parts.push(format!("The outfit suits {} weather.", weather));
    }
    if let Some(style) = non_empty(&profile.shooting_style) {
        parts.push(format!("Shot in a {} photography style.", style));
    }
    if let Some(mood) = non_empty(&profile.mood) {
        parts.push(format!("The model's expression is {}.", mood));
    }
    if let Some(pref) = non_empty(&profile.style_preference) {
        parts.push(format!("Overall styling leans {}.", pref));
    }
    if !profile.description.trim().is_empty() {
        parts.push(profile.description.trim().to_string());
    }

    parts.push(
        "Keep the person's face, pose and body unchanged. Plain studio background, \
         natural lighting, photorealistic."
            .to_string(),
    );

    parts.join(" ")
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
