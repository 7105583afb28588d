//! 3D viewer for a laid-out search tree using kiss3d.
//!
//! Nodes are drawn as small cubes at their layout positions and revealed in
//! the order the search entered them.

use kiss3d::prelude::*;

use pentotrace::layout::Position;
use pentotrace::scenarios::ScenarioReport;
use pentotrace::trace::{EventKind, TraceNode};

/// Edge length of a node cube.
const NODE_SIZE: f32 = 0.18;
/// Events revealed per Up/Down keypress.
const FAST_STEP: usize = 10;

/// Display color by node role; pruned wins over counterfactual over chain.
fn node_color(node: &TraceNode) -> Color {
    if node.pruned {
        Color::new(0.48, 0.12, 0.17, 1.0) // dark red
    } else if node.counterfactual {
        Color::new(0.49, 0.53, 0.63, 1.0) // slate
    } else if node.rightmost_chain {
        Color::new(0.83, 0.70, 0.43, 1.0) // gold
    } else {
        Color::new(0.66, 0.71, 0.78, 1.0) // light gray
    }
}

/// Adds a cube for every node entered within the first `revealed` events.
fn build_scene(
    scene: &mut SceneNode3d,
    report: &ScenarioReport,
    revealed: usize,
) -> Vec<SceneNode3d> {
    report
        .trace
        .events
        .iter()
        .take(revealed)
        .filter(|event| event.kind == EventKind::Enter)
        .filter_map(|event| {
            let node = report.trace.nodes.get(event.node)?;
            let &[x, y, z]: &Position = report.layout.get(event.node)?;
            Some(
                scene
                    .add_cube(NODE_SIZE, NODE_SIZE, NODE_SIZE)
                    .set_color(node_color(node))
                    .set_position(Vec3::new(x as f32, y as f32, z as f32)),
            )
        })
        .collect()
}

/// Displays the report's tree in an interactive 3D viewer.
pub fn display(report: ScenarioReport) {
    pollster::block_on(display_async(report));
}

async fn display_async(report: ScenarioReport) {
    let total_events = report.trace.events.len();
    if total_events == 0 {
        println!("No nodes to display");
        return;
    }

    let mut revealed = total_events;
    let title = |revealed: usize| {
        format!(
            "Event {revealed}/{total_events} - [Left/Right] step, [Up/Down] x{FAST_STEP}, [R] show all"
        )
    };

    let mut window = Window::new(&title(revealed)).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(18.0);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(0.0, 5.0, 15.0));

    let mut rendered_nodes = build_scene(&mut scene, &report, revealed);
    let mut needs_rebuild = false;

    loop {
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action == Action::Press {
                    let previous = revealed;
                    match key {
                        Key::Right => revealed = (revealed + 1).min(total_events),
                        Key::Left => revealed = revealed.saturating_sub(1),
                        Key::Up => revealed = (revealed + FAST_STEP).min(total_events),
                        Key::Down => revealed = revealed.saturating_sub(FAST_STEP),
                        Key::R => revealed = total_events,
                        _ => {}
                    }
                    needs_rebuild |= previous != revealed;
                }
            }
        }

        if needs_rebuild {
            for mut node in rendered_nodes.drain(..) {
                node.remove();
            }
            rendered_nodes = build_scene(&mut scene, &report, revealed);
            window.set_title(&title(revealed));
            needs_rebuild = false;
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }
}
