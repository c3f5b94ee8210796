//! Ad scene graph
//!
//! Each ad is a poster root entity placed in world space in front of its
//! wall, with two kinds of children: the backing board and one entity per
//! text line. Detaching the root removes the whole subtree.

use adintel_core::{layout_text_bands, Anchor, AnchorId, PlacementConfig, PlaneTransform};
use bevy_ecs::entity::Entity;
use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use bevy_math::Vec3;
use bevy_transform::components::Transform;
use tracing::debug;

/// Root of a placed ad
#[derive(Component, Debug, Clone)]
pub struct AdPoster {
    pub anchor_id: AnchorId,
    pub width: f32,
    pub height: f32,
}

/// Backing board behind the text
#[derive(Component, Debug, Clone)]
pub struct PosterBoard {
    pub depth: f32,
}

/// One line of ad copy
#[derive(Component, Debug, Clone)]
pub struct AdTextLine {
    pub index: usize,
    pub text: String,
    pub height: f32,
}

/// ECS world holding every placed ad
pub struct AdScene {
    world: World,
    posters: Vec<Entity>,
}

impl Default for AdScene {
    fn default() -> Self {
        Self::new()
    }
}

impl AdScene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            posters: Vec::new(),
        }
    }

    /// Build a poster for `text` on `anchor` and return its root entity
    pub fn spawn_ad(&mut self, anchor: &Anchor, text: &str, config: &PlacementConfig) -> Entity {
        let placement = PlaneTransform::for_anchor(anchor, config);
        let root = self
            .world
            .spawn((
                AdPoster {
                    anchor_id: anchor.id,
                    width: config.plane_width,
                    height: config.plane_height,
                },
                Transform::from_translation(placement.translation).with_rotation(placement.rotation),
            ))
            .id();

        self.world.spawn((
            PosterBoard {
                depth: config.plane_depth,
            },
            Transform::IDENTITY,
            ChildOf(root),
        ));

        // Text sits just in front of the board
        let text_z = config.plane_depth / 2.0 + config.text_offset;
        for band in layout_text_bands(text, config.plane_height) {
            self.world.spawn((
                AdTextLine {
                    index: band.index,
                    text: band.text,
                    height: band.height,
                },
                Transform::from_xyz(0.0, band.center_y, text_z),
                ChildOf(root),
            ));
        }

        self.posters.push(root);
        debug!(entity = ?root, anchor = %anchor.id, "Spawned ad poster");
        root
    }

    /// Move an existing poster to follow its anchor
    pub fn reposition(&mut self, entity: Entity, anchor: &Anchor, config: &PlacementConfig) -> bool {
        let placement = PlaneTransform::for_anchor(anchor, config);
        match self.world.get_mut::<Transform>(entity) {
            Some(mut transform) => {
                transform.translation = placement.translation;
                transform.rotation = placement.rotation;
                true
            }
            None => false,
        }
    }

    /// Remove a poster and its children. Returns false if it was already gone.
    pub fn detach(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }
        self.posters.retain(|e| *e != entity);
        let removed = self.world.despawn(entity);
        debug!(entity = ?entity, "Detached ad poster");
        removed
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.get::<AdPoster>(entity).is_some()
    }

    pub fn ad_count(&self) -> usize {
        self.posters.len()
    }

    pub fn posters(&self) -> &[Entity] {
        &self.posters
    }

    pub fn poster(&self, entity: Entity) -> Option<&AdPoster> {
        self.world.get::<AdPoster>(entity)
    }

    pub fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.world.get::<Transform>(entity)
    }

    /// Text lines of a poster, top to bottom
    pub fn text_lines(&self, entity: Entity) -> Vec<(AdTextLine, Transform)> {
        let mut lines: Vec<(AdTextLine, Transform)> = self
            .child_entities(entity)
            .into_iter()
            .filter_map(|child| {
                let line = self.world.get::<AdTextLine>(child)?;
                let transform = self.world.get::<Transform>(child)?;
                Some((line.clone(), *transform))
            })
            .collect();
        lines.sort_by_key(|(line, _)| line.index);
        lines
    }

    /// World-space position of a poster
    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.transform(entity).map(|t| t.translation)
    }

    fn child_entities(&self, entity: Entity) -> Vec<Entity> {
        match self.world.get::<Children>(entity) {
            Some(children) => {
                let children: &[Entity] = children;
                children.to_vec()
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adintel_core::Pose;
    use bevy_math::{Quat, Vec3};

    fn wall_at(z: f32) -> Anchor {
        // Normal facing the viewer at the origin
        Anchor::wall(Pose::new(Vec3::new(0.0, 0.0, z), Quat::IDENTITY))
    }

    #[test]
    fn test_spawn_builds_subtree() {
        let mut scene = AdScene::new();
        let config = PlacementConfig::default();
        let anchor = wall_at(-1.0);

        let entity = scene.spawn_ad(&anchor, "Title\nBody", &config);
        assert!(scene.contains(entity));
        assert_eq!(scene.ad_count(), 1);
        assert_eq!(scene.poster(entity).unwrap().anchor_id, anchor.id);
        // board + 2 lines
        let children = scene.child_entities(entity);
        assert_eq!(children.len(), 3);
        assert_eq!(
            children.iter().filter(|c| scene.world.get::<PosterBoard>(**c).is_some()).count(),
            1
        );

        let lines = scene.text_lines(entity);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0.text, "Title");
        assert_eq!(lines[1].0.text, "Body");
        assert!(lines[0].1.translation.y > lines[1].1.translation.y);
        assert!(lines[0].1.translation.z > 0.0);

        let position = scene.position(entity).unwrap();
        assert!((position.z - (-1.0 + config.wall_offset)).abs() < 1e-5);
    }

    #[test]
    fn test_detach_removes_children() {
        let mut scene = AdScene::new();
        let config = PlacementConfig::default();
        let first = scene.spawn_ad(&wall_at(-1.0), "A\nB\nC", &config);
        let second = scene.spawn_ad(&wall_at(-2.0), "D", &config);
        let children = scene.child_entities(first);
        assert_eq!(children.len(), 4);

        assert!(scene.detach(first));
        for child in children {
            assert!(scene.world.get::<Transform>(child).is_none());
        }
        assert!(!scene.contains(first));
        assert!(!scene.detach(first));
        assert_eq!(scene.ad_count(), 1);
        assert_eq!(scene.posters(), &[second]);
        assert_eq!(scene.text_lines(second).len(), 1);
    }

    #[test]
    fn test_reposition() {
        let mut scene = AdScene::new();
        let config = PlacementConfig::default();
        let mut anchor = wall_at(-1.0);
        let entity = scene.spawn_ad(&anchor, "Ad", &config);

        anchor.pose.position = Vec3::new(0.5, 0.0, -1.5);
        assert!(scene.reposition(entity, &anchor, &config));
        let position = scene.position(entity).unwrap();
        assert!((position.x - 0.5).abs() < 1e-5);
        assert!((position.z - (-1.5 + config.wall_offset)).abs() < 1e-5);
    }
}
