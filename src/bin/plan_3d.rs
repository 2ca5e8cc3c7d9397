//! 3D lattice motion planning demo
//!
//! Plans a unit cube through a bounded volume around a wall obstacle and
//! renders the XY projection of the explored states and the final path.

use gnuplot::{AxesCommon, Caption, Color, Figure, PointSymbol};
use nalgebra::Vector3;
use std::f32::consts::FRAC_PI_2;

use motion_planning::common::Transform3D;
use motion_planning::environment::{Environment3D, Mesh, Model, MotionPrimitive};
use motion_planning::planning::{AStarPlanner, Manhattan};

const SHOW_ANIMATION: bool = true;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("3D lattice A* planning start!!");

    // Bounded volume centered on the origin
    let mut env = Environment3D::new(Vector3::zeros(), Vector3::new(20.0, 20.0, 20.0));
    env.set_step_size(1.0);
    env.set_rotation_step_size(FRAC_PI_2);

    // Unit cube steered by single-axis primitives
    let active = Model::with_primitives(
        Mesh::cuboid(Vector3::new(0.5, 0.5, 0.5)),
        MotionPrimitive::axis_aligned(1.0, FRAC_PI_2),
    );
    env.set_active_object(&active);

    // Wall across the corridor, open below y = -2
    let mut wall = Model::new(Mesh::cuboid(Vector3::new(0.45, 4.0, 4.0)));
    wall.set_pose(Transform3D::from_position(Vector3::new(0.0, 2.0, 0.0)));
    env.add_obstacle(&wall);

    let start = Transform3D::from_position(Vector3::new(-5.0, 0.0, 0.0));
    let goal = Transform3D::from_position(Vector3::new(5.0, 0.0, 0.0));

    println!(
        "Planning from ({}, {}, {}) to ({}, {}, {})",
        start.position.x, start.position.y, start.position.z,
        goal.position.x, goal.position.y, goal.position.z
    );

    let mut planner = AStarPlanner::new(&mut env, Manhattan);
    planner.set_weight(1.0);

    let mut path = Vec::new();
    if planner.plan(&start, &goal, &mut path) {
        println!(
            "Path found with {} states after {} expansions",
            path.len(),
            planner.state_expansions()
        );

        if SHOW_ANIMATION {
            let explored_x: Vec<f64> = planner
                .explored_states()
                .iter()
                .map(|s| s.x as f64)
                .collect();
            let explored_y: Vec<f64> = planner
                .explored_states()
                .iter()
                .map(|s| s.y as f64)
                .collect();
            let path_x: Vec<f64> = path.iter().map(|t| t.position.x as f64).collect();
            let path_y: Vec<f64> = path.iter().map(|t| t.position.y as f64).collect();

            let mut fg = Figure::new();
            fg.axes2d()
                .points(&explored_x, &explored_y, &[Caption("Explored"), Color("gray"), PointSymbol('.')])
                .lines(&path_x, &path_y, &[Caption("Path"), Color("red")])
                .points(&[start.position.x as f64], &[start.position.y as f64], &[Caption("Start"), Color("green"), PointSymbol('O')])
                .points(&[goal.position.x as f64], &[goal.position.y as f64], &[Caption("Goal"), Color("blue"), PointSymbol('O')])
                .set_aspect_ratio(gnuplot::AutoOption::Fix(1.0))
                .set_title("3D Lattice A* (XY projection)", &[])
                .set_x_label("X [m]", &[])
                .set_y_label("Y [m]", &[]);

            let output_path = "img/path_planning/plan_3d_result.png";
            match fg.save_to_png(output_path, 800, 600) {
                Ok(()) => println!("Plot saved to: {}", output_path),
                Err(e) => println!("Could not save plot: {}", e),
            }
        }
    } else {
        println!("No path found!");
    }

    println!("3D lattice A* planning finish!!");
}
