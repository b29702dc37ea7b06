use approx::assert_relative_eq;

use super::{event_log, events, Recorder};
use crate::components::{BoxColliderComponent, RigidBodyComponent};
use crate::foundation::math::Vec3;
use crate::physics::{LayerMask, Ray};
use crate::scene::entity::EntityKey;
use crate::scene::Scene;

const STEP: f32 = 0.02;

fn weightless_scene() -> Scene {
    let mut scene = Scene::new("Physics");
    scene.set_fixed_delta_time(STEP);
    scene.set_gravity(Vec3::zeros());
    scene
}

fn spawn_box(scene: &mut Scene, name: &str, position: Vec3, body: Option<RigidBodyComponent>) -> EntityKey {
    let key = scene.spawn(name);
    if let Some(entity) = scene.graph_mut().get_mut(key) {
        entity.transform_mut().set_position(position);
    }
    if let Some(body) = body {
        scene.add_component(key, Box::new(body)).unwrap();
    }
    scene
        .add_component(key, Box::new(BoxColliderComponent::default()))
        .unwrap();
    key
}

fn x_of(scene: &Scene, key: EntityKey) -> f32 {
    scene.graph().world_position(key).unwrap().x
}

fn move_to(scene: &mut Scene, key: EntityKey, position: Vec3) {
    if let Some(entity) = scene.graph_mut().get_mut(key) {
        entity.transform_mut().set_position(position);
    }
}

#[test]
fn test_equal_masses_push_apart_evenly() {
    let mut scene = weightless_scene();
    let a = spawn_box(&mut scene, "A", Vec3::zeros(), Some(RigidBodyComponent::new(1.0)));
    let b = spawn_box(&mut scene, "B", Vec3::new(0.8, 0.0, 0.0), Some(RigidBodyComponent::new(1.0)));

    scene.play().unwrap();
    let stats = scene.update(STEP);

    assert_eq!(stats.contacts_entered, 1);
    assert_relative_eq!(x_of(&scene, a), -0.1, epsilon = 1.0e-5);
    assert_relative_eq!(x_of(&scene, b), 0.9, epsilon = 1.0e-5);
}

#[test]
fn test_static_collider_does_not_move() {
    let mut scene = weightless_scene();
    let dynamic = spawn_box(&mut scene, "Dynamic", Vec3::zeros(), Some(RigidBodyComponent::new(1.0)));
    let wall = spawn_box(&mut scene, "Wall", Vec3::new(0.8, 0.0, 0.0), None);

    scene.play().unwrap();
    scene.update(STEP);

    assert_relative_eq!(x_of(&scene, dynamic), -0.2, epsilon = 1.0e-5);
    assert_relative_eq!(x_of(&scene, wall), 0.8, epsilon = 1.0e-6);
}

#[test]
fn test_falling_body_bounces_off_ground() {
    let mut scene = weightless_scene();
    spawn_box(&mut scene, "Ground", Vec3::zeros(), None);
    let ball = spawn_box(
        &mut scene,
        "Ball",
        Vec3::new(0.0, 0.9, 0.0),
        Some(RigidBodyComponent::new(1.0).with_velocity(Vec3::new(0.0, -10.0, 0.0))),
    );

    scene.play().unwrap();
    scene.update(STEP);

    // Integrated to y = 0.7, pushed out by the 0.3 overlap, bounced with e = 0.2.
    let position = scene.graph().world_position(ball).unwrap();
    assert_relative_eq!(position.y, 1.0, epsilon = 1.0e-5);
    let velocity = scene.graph().get(ball).unwrap().rigid_body().unwrap().velocity;
    assert_relative_eq!(velocity.y, 2.0, epsilon = 1.0e-4);
}

#[test]
fn test_trigger_enter_and_exit_fire_once() {
    let log = event_log();
    let mut scene = weightless_scene();

    let zone = scene.spawn("Zone");
    scene
        .add_component(zone, Box::new(BoxColliderComponent::default().trigger()))
        .unwrap();
    scene.add_component(zone, Box::new(Recorder::new("zone", &log))).unwrap();
    let visitor = spawn_box(&mut scene, "Visitor", Vec3::new(5.0, 0.0, 0.0), None);
    scene.add_component(visitor, Box::new(Recorder::new("visitor", &log))).unwrap();

    let contact_events = || {
        events(&log)
            .into_iter()
            .filter(|e| e.contains("trigger") || e.contains("collision"))
            .collect::<Vec<_>>()
    };

    scene.play().unwrap();
    scene.update(STEP);
    assert!(contact_events().is_empty());

    move_to(&mut scene, visitor, Vec3::new(0.5, 0.0, 0.0));
    for _ in 0..3 {
        scene.update(STEP);
    }
    assert_eq!(contact_events(), vec!["zone:trigger_enter", "visitor:trigger_enter"]);
    // Triggers never push.
    assert_relative_eq!(x_of(&scene, visitor), 0.5, epsilon = 1.0e-6);

    move_to(&mut scene, visitor, Vec3::new(5.0, 0.0, 0.0));
    for _ in 0..3 {
        scene.update(STEP);
    }
    assert_eq!(
        contact_events(),
        vec![
            "zone:trigger_enter",
            "visitor:trigger_enter",
            "zone:trigger_exit",
            "visitor:trigger_exit",
        ]
    );
}

#[test]
fn test_collision_enter_and_exit_fire_once() {
    let log = event_log();
    let mut scene = weightless_scene();
    let a = spawn_box(&mut scene, "A", Vec3::zeros(), None);
    let b = spawn_box(&mut scene, "B", Vec3::new(5.0, 0.0, 0.0), None);
    scene.add_component(a, Box::new(Recorder::new("a", &log))).unwrap();
    scene.add_component(b, Box::new(Recorder::new("b", &log))).unwrap();

    let collisions = || {
        events(&log)
            .into_iter()
            .filter(|e| e.contains("collision") || e.contains("trigger"))
            .collect::<Vec<_>>()
    };

    scene.play().unwrap();
    scene.update(STEP);
    assert!(collisions().is_empty());

    move_to(&mut scene, b, Vec3::new(0.5, 0.0, 0.0));
    for _ in 0..3 {
        scene.update(STEP);
    }
    assert_eq!(collisions(), vec!["a:collision_enter", "b:collision_enter"]);

    move_to(&mut scene, b, Vec3::new(5.0, 0.0, 0.0));
    for _ in 0..3 {
        scene.update(STEP);
    }
    assert_eq!(
        collisions(),
        vec![
            "a:collision_enter",
            "b:collision_enter",
            "a:collision_exit",
            "b:collision_exit",
        ]
    );
}

#[test]
fn test_every_overlapping_pair_enters_in_one_step() {
    let log = event_log();
    let mut scene = weightless_scene();
    let a = spawn_box(&mut scene, "A", Vec3::zeros(), None);
    let b = spawn_box(&mut scene, "B", Vec3::new(0.8, 0.0, 0.0), Some(RigidBodyComponent::new(1.0)));
    let c = spawn_box(&mut scene, "C", Vec3::new(-0.15, 0.95, 0.0), None);
    scene.add_component(a, Box::new(Recorder::new("a", &log))).unwrap();
    scene.add_component(b, Box::new(Recorder::new("b", &log))).unwrap();
    scene.add_component(c, Box::new(Recorder::new("c", &log))).unwrap();

    scene.play().unwrap();
    let stats = scene.update(STEP);

    // Pushing B out of A also separates it from C, but the B/C overlap
    // existed at the start of the step and still counts.
    assert_eq!(stats.contacts_entered, 3);
    let c_enters = events(&log)
        .iter()
        .filter(|e| e.as_str() == "c:collision_enter")
        .count();
    assert_eq!(c_enters, 2);
    assert_relative_eq!(x_of(&scene, b), 1.0, epsilon = 1.0e-5);
    let (id_b, id_c) = (
        scene.graph().entity_id(b).unwrap(),
        scene.graph().entity_id(c).unwrap(),
    );
    assert!(scene.physics().is_touching(id_b, id_c));

    scene.update(STEP);
    assert!(!scene.physics().is_touching(id_b, id_c));
}

#[test]
fn test_child_body_moves_in_world_space_under_turned_parent() {
    let mut scene = weightless_scene();
    let rig = scene.spawn("Rig");
    if let Some(entity) = scene.graph_mut().get_mut(rig) {
        entity.transform_mut().set_rotation(Vec3::new(0.0, 90.0, 0.0));
        entity.transform_mut().set_scale(Vec3::new(2.0, 2.0, 2.0));
    }
    let child = scene.graph_mut().spawn_child(rig, "Child").unwrap();
    scene
        .add_component(
            child,
            Box::new(RigidBodyComponent::new(1.0).with_velocity(Vec3::new(1.0, 0.0, 0.0))),
        )
        .unwrap();

    scene.play().unwrap();
    scene.update(STEP);

    let position = scene.graph().world_position(child).unwrap();
    assert_relative_eq!(position, Vec3::new(STEP, 0.0, 0.0), epsilon = 1.0e-5);
}

#[test]
fn test_contact_correction_under_turned_parent() {
    let mut scene = weightless_scene();
    let rig = scene.spawn("Rig");
    if let Some(entity) = scene.graph_mut().get_mut(rig) {
        entity.transform_mut().set_rotation(Vec3::new(0.0, 90.0, 0.0));
        entity.transform_mut().set_scale(Vec3::new(2.0, 2.0, 2.0));
    }
    let child = scene.graph_mut().spawn_child(rig, "Child").unwrap();
    scene.add_component(child, Box::new(RigidBodyComponent::new(1.0))).unwrap();
    scene
        .add_component(child, Box::new(BoxColliderComponent::default()))
        .unwrap();
    // The child's box is 2 wide in world space, overlapping the wall by 0.2.
    spawn_box(&mut scene, "Wall", Vec3::new(1.3, 0.0, 0.0), None);

    scene.play().unwrap();
    scene.update(STEP);

    let position = scene.graph().world_position(child).unwrap();
    assert_relative_eq!(position, Vec3::new(-0.2, 0.0, 0.0), epsilon = 1.0e-5);
}

#[test]
fn test_collision_callbacks_reach_both_sides() {
    let log = event_log();
    let mut scene = weightless_scene();
    let a = spawn_box(&mut scene, "A", Vec3::zeros(), None);
    let b = spawn_box(&mut scene, "B", Vec3::new(0.5, 0.0, 0.0), None);
    scene.add_component(a, Box::new(Recorder::new("a", &log))).unwrap();
    scene.add_component(b, Box::new(Recorder::new("b", &log))).unwrap();

    scene.play().unwrap();
    scene.update(STEP);
    scene.update(STEP);

    let collisions: Vec<String> = events(&log)
        .into_iter()
        .filter(|e| e.contains("collision"))
        .collect();
    assert_eq!(collisions, vec!["a:collision_enter", "b:collision_enter"]);
    let (id_a, id_b) = (
        scene.graph().entity_id(a).unwrap(),
        scene.graph().entity_id(b).unwrap(),
    );
    assert!(scene.physics().is_touching(id_a, id_b));
}

#[test]
fn test_exit_reaches_survivor_after_partner_destroyed() {
    let log = event_log();
    let mut scene = weightless_scene();
    let a = spawn_box(&mut scene, "A", Vec3::zeros(), None);
    let b = spawn_box(&mut scene, "B", Vec3::new(0.5, 0.0, 0.0), None);
    scene.add_component(a, Box::new(Recorder::new("a", &log))).unwrap();

    scene.play().unwrap();
    scene.update(STEP);
    scene.destroy(b);
    scene.update(0.0);
    scene.update(STEP);

    let exits: Vec<String> = events(&log)
        .into_iter()
        .filter(|e| e.ends_with("exit"))
        .collect();
    assert_eq!(exits, vec!["a:collision_exit"]);
}

#[test]
fn test_disabled_physics_leaves_bodies_alone() {
    let mut scene = weightless_scene();
    scene.set_gravity(Vec3::new(0.0, -9.81, 0.0));
    scene.physics_mut().enabled = false;
    let body = spawn_box(&mut scene, "Body", Vec3::zeros(), Some(RigidBodyComponent::new(1.0)));

    scene.play().unwrap();
    scene.update(STEP * 5.0);

    assert_eq!(scene.graph().world_position(body).unwrap(), Vec3::zeros());
}

#[test]
fn test_raycast_through_scene() {
    let mut scene = weightless_scene();
    let target = spawn_box(&mut scene, "Target", Vec3::new(0.0, 0.0, 5.0), None);
    if let Some(entity) = scene.graph_mut().get_mut(target) {
        entity.layer = 3;
    }

    let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
    let hit = scene.raycast(&ray, 100.0).unwrap();
    assert_eq!(hit.entity, target);
    assert_relative_eq!(hit.distance, 4.5, epsilon = 1.0e-5);
    assert_relative_eq!(hit.normal, Vec3::new(0.0, 0.0, -1.0));

    assert!(scene.raycast(&ray, 4.0).is_none());
    assert!(scene.raycast_filtered(&ray, 100.0, LayerMask::layer(1)).is_none());
    assert!(scene.raycast_filtered(&ray, 100.0, LayerMask::layer(3)).is_some());
}
