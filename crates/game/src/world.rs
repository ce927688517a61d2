use glam::Vec3;
use quarry_kernel::{Body, PhysicsWorld};
use quarry_scene::SceneDescription;

const GOLDEN_ANGLE: f32 = 2.399_963;

/// A static pedestal on the terrain plane plus `count` boxes dropped in a
/// spiral above it. Layout depends only on the inputs.
pub fn demo_world(scene: &SceneDescription, count: u32) -> PhysicsWorld {
    let ground = scene.terrain.position.y;
    let mut world = PhysicsWorld::new().with_ground_height(ground);

    world.add_body(Body {
        half_extent: 2.0,
        is_static: true,
        ..Body::at(Vec3::new(0.0, ground + 2.0, 0.0))
    });

    for i in 0..count {
        let f = i as f32;
        let angle = f * GOLDEN_ANGLE;
        let radius = 4.0 + f * 0.75;
        world.add_body(Body {
            restitution: 0.3 + 0.4 * ((i % 5) as f32 / 4.0),
            ..Body::at(Vec3::new(
                radius * angle.cos(),
                ground + 6.0 + f * 1.5,
                radius * angle.sin(),
            ))
        });
    }

    tracing::debug!(bodies = world.body_count(), ground, "demo world built");
    world
}
