mod settings;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};
use waypath_navigation::LayoutGenerator;

use settings::{DEFAULT_CONFIG_PATH, load_settings};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let settings = load_settings(DEFAULT_CONFIG_PATH)?;

    let generator = LayoutGenerator::new(settings.layout).context("invalid layout configuration")?;
    let layout = generator.generate().context("layout generation failed")?;

    info!(
        seed = generator.config().seed,
        points = layout.points.len(),
        triangles = layout.triangulation.triangles.len(),
        edges = layout.triangulation.unique_edges().len(),
        links = layout.graph.edge_count(),
        iterations = layout.iterations,
        "Layout ready"
    );
    if layout.spacing_violations > 0 {
        warn!(pairs = layout.spacing_violations, "Samples closer than the minimum radius");
    }

    if layout.route.is_empty() {
        warn!("Goal is unreachable from the start point");
        return Ok(());
    }

    info!(
        waypoints = layout.route.len(),
        length = layout.route.length(),
        "Route from start to goal"
    );
    for (i, point) in layout.route_points().iter().enumerate() {
        info!(waypoint = i, x = point.x, y = point.y);
    }

    Ok(())
}
