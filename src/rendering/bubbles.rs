//! Flat circle rendering of the engine's bubbles.
//!
//! Each bubble is a root entity positioned in camera space with unit-radius fill and outline
//! children scaled to the current radius, plus an unscaled text label.

use bevy::prelude::*;

use crate::app::picker::Picker;
use crate::core::components::{BubbleFill, BubbleLabel, BubbleOutline, BubbleRadius, BubbleVisual};
use crate::core::system::system_order::PickerSyncSet;
use crate::interaction::viewport::Viewport;
use crate::rendering::palette::{fill_color, label_color, outline_color};

/// Outline ring thickness relative to the radius.
const OUTLINE_WIDTH: f32 = 0.06;
const LABEL_FONT_SIZE: f32 = 16.0;

#[derive(Resource, Debug, Clone)]
pub struct BubbleMeshes {
    pub circle: Handle<Mesh>,
    pub ring: Handle<Mesh>,
}

pub struct BubbleRenderPlugin;

impl Plugin for BubbleRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_bubble_meshes).add_systems(
            Update,
            (respawn_bubble_visuals, sync_bubble_roots, sync_bubble_children)
                .chain()
                .in_set(PickerSyncSet),
        );
    }
}

fn setup_bubble_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(BubbleMeshes {
        circle: meshes.add(Circle::new(1.0)),
        ring: meshes.add(Annulus::new(1.0 - OUTLINE_WIDTH, 1.0)),
    });
}

/// Despawns and respawns every visual whenever the picker was rebuilt.
fn respawn_bubble_visuals(
    mut commands: Commands,
    picker: Res<Picker>,
    meshes: Option<Res<BubbleMeshes>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    existing: Query<Entity, With<BubbleVisual>>,
    mut spawned_generation: Local<Option<u32>>,
) {
    let Some(meshes) = meshes else {
        return;
    };
    if *spawned_generation == Some(picker.generation) {
        return;
    }
    *spawned_generation = Some(picker.generation);
    for entity in &existing {
        commands.entity(entity).despawn();
    }
    for bubble in picker.bubbles() {
        let payload = &bubble.item.payload;
        let fill = materials.add(fill_color(payload, bubble.id.0));
        let outline = materials.add(outline_color(payload));
        let mut root = commands.spawn((
            BubbleVisual { id: bubble.id },
            BubbleRadius(bubble.body.actual_radius),
            Transform::default(),
            Visibility::Hidden,
        ));
        root.with_children(|parent| {
            parent.spawn((
                BubbleFill,
                Mesh2d::from(meshes.circle.clone()),
                MeshMaterial2d(fill),
                Transform::default(),
            ));
            parent.spawn((
                BubbleOutline,
                Mesh2d::from(meshes.ring.clone()),
                MeshMaterial2d(outline),
                Transform::from_xyz(0.0, 0.0, 0.1),
                Visibility::Hidden,
            ));
            if let Some(title) = payload.title.as_ref() {
                parent.spawn((
                    BubbleLabel,
                    Text2d::new(title.clone()),
                    TextFont {
                        font_size: LABEL_FONT_SIZE,
                        ..default()
                    },
                    TextColor(label_color(payload)),
                    Transform::from_xyz(0.0, 0.0, 0.2),
                ));
            }
        });
    }
    debug!(
        "spawned {} bubble visuals (generation {})",
        picker.bubbles().len(),
        picker.generation
    );
}

fn sync_bubble_roots(
    picker: Res<Picker>,
    viewport: Res<Viewport>,
    mut roots: Query<(&BubbleVisual, &mut Transform, &mut Visibility, &mut BubbleRadius)>,
) {
    let ppu = viewport.pixels_per_unit();
    for (visual, mut tf, mut vis, mut radius) in &mut roots {
        let Some(bubble) = picker.bubble(visual.id) else {
            continue;
        };
        let body = &bubble.body;
        let position = viewport.world_to_camera(body.position);
        tf.translation.x = position.x;
        tf.translation.y = position.y;
        // Enlarged bubbles draw above their neighbours.
        tf.translation.z = if body.increased || body.to_be_increased { 1.0 } else { 0.0 };
        radius.0 = body.actual_radius * ppu;
        vis.set_if_neq(if body.is_visible && body.actual_radius > 0.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
}

fn sync_bubble_children(
    picker: Res<Picker>,
    roots: Query<(&BubbleVisual, &BubbleRadius)>,
    mut fills: Query<(&ChildOf, &mut Transform), (With<BubbleFill>, Without<BubbleVisual>)>,
    mut outlines: Query<
        (&ChildOf, &mut Transform, &mut Visibility),
        (With<BubbleOutline>, Without<BubbleFill>, Without<BubbleVisual>),
    >,
) {
    for (child_of, mut tf) in &mut fills {
        if let Ok((_, radius)) = roots.get(child_of.parent()) {
            tf.scale = Vec3::new(radius.0, radius.0, 1.0);
        }
    }
    for (child_of, mut tf, mut vis) in &mut outlines {
        let Ok((visual, radius)) = roots.get(child_of.parent()) else {
            continue;
        };
        tf.scale = Vec3::new(radius.0, radius.0, 1.0);
        let shown = picker.bubble(visual.id).is_some_and(|b| {
            b.item.is_view_border_selected || b.body.increased || picker.selected() == Some(b.id)
        });
        vis.set_if_neq(if shown { Visibility::Inherited } else { Visibility::Hidden });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PickerConfig;
    use crate::core::item::PickerItem;
    use crate::physics::events::BubbleId;

    #[test]
    fn roots_follow_engine_positions() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let mut picker = Picker::new(PickerConfig::default());
        let viewport = Viewport::new(800.0, 800.0);
        let scale = viewport.scale();
        picker
            .engine
            .build(vec![PickerItem::new("a", 1.0), PickerItem::new("b", 1.0)], scale.x, scale.y);
        app.insert_resource(picker).insert_resource(viewport);
        app.add_systems(Update, sync_bubble_roots);
        let root = app
            .world_mut()
            .spawn((
                BubbleVisual { id: BubbleId(1) },
                BubbleRadius(0.0),
                Transform::default(),
                Visibility::Hidden,
            ))
            .id();
        app.update();
        let world = app.world();
        let tf = world.get::<Transform>(root).expect("transform");
        // Second bubble spawns at (0, -0.15); 400 px per unit.
        assert!((tf.translation.y + 60.0).abs() < 1e-3);
        assert_eq!(*world.get::<Visibility>(root).expect("visibility"), Visibility::Inherited);
        assert!(world.get::<BubbleRadius>(root).expect("radius").0 > 0.0);
    }
}
