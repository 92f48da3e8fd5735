//! Human-readable model summary.

use crate::model::Model;

/// Summarize a model: counts, per-link and total mass, and the mesh files it needs.
///
/// Output is deterministic (links and meshes sorted by name, masses with
/// three decimals) so it can be compared verbatim in tests.
pub fn report(model: &Model) -> String {
    let mut lines = vec![
        format!("Model: {}", model.name),
        format!("Number of Links: {}", model.link_count()),
        format!("Number of Joints: {}", model.joint_count()),
        String::new(),
        "Mass information:".to_string(),
    ];

    for (name, link) in &model.links {
        lines.push(format!("  - {}: {:.3} kg", name, link.inertial.mass));
    }
    lines.push(format!("Total mass: {:.3} kg", model.total_mass()));

    lines.push(String::new());
    lines.push("Required mesh files:".to_string());
    lines.extend(
        model
            .visual_mesh_names()
            .into_iter()
            .map(|name| format!("  - {}", name)),
    );

    if !model.collisions.is_empty() {
        lines.push(String::new());
        lines.push("Name collisions:".to_string());
        for collision in &model.collisions {
            lines.push(format!(
                "  - {} '{}' replaced an earlier definition",
                collision.kind, collision.name
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
