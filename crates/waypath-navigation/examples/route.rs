use waypath_navigation::{LayoutConfig, LayoutGenerator, RouteCost};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for route_cost in [RouteCost::Hops, RouteCost::Distance] {
        let config = LayoutConfig {
            route_cost,
            ..LayoutConfig::default()
        };
        let layout = LayoutGenerator::new(config)?.generate()?;

        println!("Route cost: {:?}", route_cost);
        println!(
            "{} points, {} triangles, {} forward links",
            layout.points.len(),
            layout.triangulation.triangles.len(),
            layout.graph.edge_count()
        );

        if layout.route.is_empty() {
            println!("No route found.\n");
            continue;
        }

        println!(
            "Route with {} waypoints, length {:.2}:",
            layout.route.len(),
            layout.route.length()
        );
        for (id, point) in layout.route.nodes.iter().zip(layout.route_points()) {
            println!("  {} ({:6.2}, {:6.2})", id, point.x, point.y);
        }
        println!();
    }

    Ok(())
}
