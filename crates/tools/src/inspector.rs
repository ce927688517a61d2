use quarry_common::BodyId;
use quarry_kernel::PhysicsWorld;
use std::fmt;

/// Bodies slower than this count as resting in summaries.
const RESTING_SPEED: f32 = 0.01;

/// Simulation inspector for developer tooling.
///
/// Call from inside `SharedSimulation::read_locked`; each query is a single
/// pass over the bodies.
pub struct SimInspector;

impl SimInspector {
    pub fn summary(world: &PhysicsWorld) -> SimSummary {
        let mut resting = 0;
        let mut highest: Option<f32> = None;
        for body in world.bodies().values() {
            if body.is_static || body.velocity.length() < RESTING_SPEED {
                resting += 1;
            }
            let y = body.transform.position.y;
            highest = Some(highest.map_or(y, |h| h.max(y)));
        }
        SimSummary {
            tick: world.tick(),
            sim_time: world.sim_time(),
            body_count: world.body_count(),
            resting,
            highest,
            state_hash: world.state_hash(),
        }
    }

    pub fn inspect_body(world: &PhysicsWorld, id: BodyId) -> Option<BodyInfo> {
        world.body(id).map(|body| BodyInfo {
            id,
            position: body.transform.position.to_array(),
            velocity: body.velocity.to_array(),
            is_static: body.is_static,
        })
    }

    pub fn list_bodies(world: &PhysicsWorld) -> Vec<BodyId> {
        world.bodies().keys().copied().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimSummary {
    pub tick: u64,
    pub sim_time: f64,
    pub body_count: usize,
    /// Static bodies plus dynamic bodies that have stopped.
    pub resting: usize,
    /// Height of the highest body, `None` for an empty world.
    pub highest: Option<f32>,
    pub state_hash: u64,
}

impl fmt::Display for SimSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sim: tick={} t={:.2}s bodies={} resting={} hash={:016x}",
            self.tick, self.sim_time, self.body_count, self.resting, self.state_hash
        )?;
        if let Some(h) = self.highest {
            write!(f, " top={h:.2}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyInfo {
    pub id: BodyId,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub is_static: bool,
}

impl fmt::Display for BodyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Body [{}] pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2})",
            self.id.short(),
            self.position[0],
            self.position[1],
            self.position[2],
            self.velocity[0],
            self.velocity[1],
            self.velocity[2],
        )?;
        if self.is_static {
            f.write_str(" static")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use quarry_kernel::Body;

    #[test]
    fn summary_empty_world() {
        let summary = SimInspector::summary(&PhysicsWorld::new());
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.body_count, 0);
        assert_eq!(summary.highest, None);
    }

    #[test]
    fn summary_counts_resting_bodies() {
        let mut world = PhysicsWorld::new();
        world.add_body(Body {
            is_static: true,
            ..Body::at(Vec3::new(0.0, 12.0, 0.0))
        });
        world.add_body(Body::at(Vec3::new(0.0, 5.0, 0.0)));
        world.step(1.0 / 45.0);

        let summary = SimInspector::summary(&world);
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.body_count, 2);
        assert_eq!(summary.resting, 1);
        assert_eq!(summary.highest, Some(12.0));
        assert_eq!(summary.state_hash, world.state_hash());
    }

    #[test]
    fn inspect_body_found_and_missing() {
        let mut world = PhysicsWorld::new();
        let id = world.add_body(Body::at(Vec3::new(1.0, 2.0, 3.0)));
        let info = SimInspector::inspect_body(&world, id).unwrap();
        assert_eq!(info.position, [1.0, 2.0, 3.0]);
        assert!(info.to_string().starts_with("Body ["));

        assert!(SimInspector::inspect_body(&world, BodyId::new()).is_none());
    }

    #[test]
    fn list_bodies() {
        let mut world = PhysicsWorld::new();
        let a = world.add_body(Body::default());
        let b = world.add_body(Body::default());
        let ids = SimInspector::list_bodies(&world);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a) && ids.contains(&b));
    }

    #[test]
    fn summary_display() {
        let s = SimInspector::summary(&PhysicsWorld::new()).to_string();
        assert!(s.contains("tick=0"));
        assert!(!s.contains("top="));
    }
}
