use crate::ecs::{EntityCollection, EntityId};
use crate::geometry::{Rect, Vec2};
use crate::input::InputAction;

use super::component::UIComponent;
use super::components::{
    FocusClusterRoot, HasCircularProgress, HasColor, HasLabel, HasOpacity, HasRoundedCorners,
    HasUIModifiers, ShouldHide, TextAlignment,
};
use super::context::{ROOT, UIContext};
use super::text::{HasTextAreaState, HasTextInputState};
use super::text_cache::TextMeasureCache;
use super::color::{Color, auto_text_color};

/// Opaque texture handle owned by the host's renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHandle(pub u64);

/// Drawing surface the host implements; the library never draws directly.
pub trait UIRenderer {
    fn draw_rectangle(&mut self, rect: Rect, color: Color);
    fn draw_rectangle_rounded(
        &mut self,
        rect: Rect,
        roundness: f32,
        segments: u8,
        color: Color,
        corner_mask: u8,
    );
    fn draw_rectangle_outline(&mut self, rect: Rect, color: Color, thickness: f32);
    fn draw_text(&mut self, font_name: &str, text: &str, pos: Vec2, size: f32, spacing: f32,
        color: Color);
    fn draw_texture(&mut self, texture: TextureHandle, source: Rect, dest: Rect, tint: Color);
    /// Ring segment for circular progress. `progress` in [0, 1].
    fn draw_ring(&mut self, center: Vec2, inner_radius: f32, outer_radius: f32, progress: f32,
        segments: u8, color: Color);
}

/// Text measurement the host implements (wired into the
/// [`TextMeasureCache`] or passed to the layout system directly).
pub trait FontBackend {
    fn measure_text(&self, font_name: &str, text: &str, font_size: f32, spacing: f32) -> Vec2;
}

fn apply_opacity(color: Color, opacity: f32) -> Color {
    color.with_alpha((color.a as f32 * opacity.clamp(0.0, 1.0)) as u8)
}

fn resolve_text_color<A: InputAction>(
    context: &UIContext<A>,
    label: &HasLabel,
    background: Option<Color>,
) -> Color {
    if let Some(explicit) = label.color {
        return explicit;
    }
    let background = match label.background_hint {
        Some(usage) => context.theme.from_usage(usage, label.disabled),
        None => background.unwrap_or(context.theme.background),
    };
    let color = auto_text_color(background, context.theme.font, context.theme.darkfont);
    if label.disabled {
        return color.darken(0.3);
    }
    color
}

/// Drain the context's render queue in `(layer, id)` order and draw every
/// queued widget: background, label, editor caret, focus ring. Entities that
/// disappeared since queuing are skipped.
pub fn render_ui<A: InputAction, R: UIRenderer>(
    collection: &mut EntityCollection,
    renderer: &mut R,
) {
    let Some(context) = collection.get_singleton_cmp_mut::<UIContext<A>>() else {
        return;
    };
    let cmds = context.drain_render_cmds();
    let visual_focus = context.visual_focus_id;

    for cmd in cmds {
        draw_widget::<A, R>(collection, renderer, cmd.id);
    }

    draw_focus_ring::<A, R>(collection, renderer, visual_focus);
}

fn draw_widget<A: InputAction, R: UIRenderer>(
    collection: &mut EntityCollection,
    renderer: &mut R,
    id: EntityId,
) {
    let Some(entity) = collection.get_entity_for_id(id) else {
        // The widget was removed after queuing; tolerated.
        return;
    };
    if entity.has::<ShouldHide>() {
        return;
    }
    let Some(cmp) = entity.get::<UIComponent>() else {
        return;
    };
    if !cmp.is_visible {
        return;
    }

    let mut rect = cmp.rect();
    if let Some(modifiers) = entity.get::<HasUIModifiers>() {
        rect.x += modifiers.translate.x;
        rect.y += modifiers.translate.y;
        rect.width *= modifiers.scale;
        rect.height *= modifiers.scale;
    }
    let opacity = entity
        .get::<HasOpacity>()
        .map(|has_opacity| has_opacity.value)
        .unwrap_or(1.0);

    let font_name = cmp.font_name.clone();
    let font_size = if cmp.font_size.value > 0.0 {
        cmp.font_size.value
    } else {
        20.0
    };

    let background = entity.get::<HasColor>().map(|has_color| has_color.color);
    if let Some(color) = background {
        let color = apply_opacity(color, opacity);
        match entity.get::<HasRoundedCorners>() {
            Some(corners) if corners.corners.any() => renderer.draw_rectangle_rounded(
                rect,
                corners.roundness,
                corners.segments,
                color,
                corners.corners.0,
            ),
            _ => renderer.draw_rectangle(rect, color),
        }
    }

    if let Some(ring) = entity.get::<HasCircularProgress>() {
        let context = collection.get_singleton_cmp::<UIContext<A>>();
        let color = context
            .map(|context| context.theme.primary)
            .unwrap_or(Color::PACIFIC_BLUE);
        let outer = rect.width.min(rect.height) / 2.0;
        renderer.draw_ring(
            rect.center(),
            (outer - ring.thickness).max(0.0),
            outer,
            ring.value.clamp(0.0, 1.0),
            32,
            apply_opacity(color, opacity),
        );
        return;
    }

    // Labels draw over the background with auto-contrast unless an explicit
    // color was set.
    let label_draw = entity.get::<HasLabel>().and_then(|label| {
        if label.label.is_empty() {
            return None;
        }
        let context = collection.get_singleton_cmp::<UIContext<A>>()?;
        let color = resolve_text_color(context, label, background);
        Some((label.label.clone(), label.alignment, color))
    });

    // Editors draw their display text and a blinking caret. The caret
    // position counts codepoints so masked fields line up.
    let editor_draw = entity.get::<HasTextInputState>().map(|state| {
        let cursor_chars = state
            .text()
            .get(..state.cursor_position.min(state.text_size()))
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        (
            state.display_text(),
            cursor_chars,
            state.cursor_visible() && state.is_focused,
        )
    });

    if let Some((text, alignment, color)) = label_draw {
        let measured = measure_for_render(collection, &font_name, &text, font_size);
        let pos = align_text(rect, measured, alignment);
        renderer.draw_text(
            &font_name,
            &text,
            pos,
            font_size,
            1.0,
            apply_opacity(color, opacity),
        );
    }

    if let Some((text, cursor_chars, caret_visible)) = editor_draw {
        let color = collection
            .get_singleton_cmp::<UIContext<A>>()
            .map(|context| context.theme.font)
            .unwrap_or(Color::WHITE);
        let pos = Vec2::new(rect.x + 4.0, rect.y + (rect.height - font_size) / 2.0);
        renderer.draw_text(&font_name, &text, pos, font_size, 1.0, color);

        if caret_visible {
            let prefix: String = text.chars().take(cursor_chars).collect();
            let caret_x = pos.x + measure_for_render(collection, &font_name, &prefix, font_size).x;
            renderer.draw_rectangle(
                Rect::new(caret_x, rect.y + 4.0, 2.0, rect.height - 8.0),
                color,
            );
        }
    }

    // Multi-line editors draw the visible slice of their lines.
    let area_lines = collection
        .get_entity_for_id(id)
        .and_then(|entity| entity.get::<HasTextAreaState>())
        .map(|area| {
            let first_visible = (area.scroll_offset_y / area.line_height).floor() as usize;
            let visible = ((rect.height / area.line_height).ceil() as usize).saturating_add(1);
            let text = area.text().to_string();
            let line_height = area.line_height;
            (text, first_visible, visible, line_height)
        });
    if let Some((text, first_visible, visible, line_height)) = area_lines {
        let color = collection
            .get_singleton_cmp::<UIContext<A>>()
            .map(|context| context.theme.font)
            .unwrap_or(Color::WHITE);
        for (row, line) in text.lines().enumerate().skip(first_visible).take(visible) {
            let y = rect.y + (row - first_visible) as f32 * line_height;
            renderer.draw_text(
                &font_name,
                line,
                Vec2::new(rect.x + 4.0, y),
                font_size,
                1.0,
                color,
            );
        }
    }

    mark_rendered(collection, id);
}

fn mark_rendered(collection: &mut EntityCollection, id: EntityId) {
    if let Some(cmp) = collection
        .get_entity_for_id_mut(id)
        .and_then(|entity| entity.get_mut::<UIComponent>())
    {
        cmp.was_rendered_to_screen = true;
    }
}

fn measure_for_render(
    collection: &mut EntityCollection,
    font_name: &str,
    text: &str,
    font_size: f32,
) -> Vec2 {
    collection
        .get_singleton_cmp_mut::<TextMeasureCache>()
        .map(|cache| cache.measure(text, font_name, font_size, 1.0))
        .unwrap_or(Vec2::ZERO)
}

fn align_text(rect: Rect, measured: Vec2, alignment: TextAlignment) -> Vec2 {
    let y = rect.y + (rect.height - measured.y).max(0.0) / 2.0;
    match alignment {
        TextAlignment::Left | TextAlignment::None => Vec2::new(rect.x + 4.0, y),
        TextAlignment::Center => Vec2::new(rect.x + (rect.width - measured.x).max(0.0) / 2.0, y),
        TextAlignment::Right => Vec2::new(rect.x + (rect.width - measured.x).max(0.0) - 4.0, y),
    }
}

fn draw_focus_ring<A: InputAction, R: UIRenderer>(
    collection: &EntityCollection,
    renderer: &mut R,
    visual_focus: EntityId,
) {
    if visual_focus == ROOT {
        return;
    }
    let Some(entity) = collection.get_entity_for_id(visual_focus) else {
        return;
    };
    // The ring anchors to the cluster root when the focused widget belongs
    // to one; either way it draws around the anchor's rectangle.
    let _ = entity.has::<FocusClusterRoot>();
    let Some(cmp) = entity.get::<UIComponent>() else {
        return;
    };
    if !cmp.is_visible {
        return;
    }
    let Some(context) = collection.get_singleton_cmp::<UIContext<A>>() else {
        return;
    };
    let offset = context.theme.focus_ring_offset;
    let rect = cmp.rect();
    renderer.draw_rectangle_outline(
        Rect::new(
            rect.x - offset,
            rect.y - offset,
            rect.width + offset * 2.0,
            rect.height + offset * 2.0,
        ),
        context.theme.focus,
        context.theme.focus_ring_thickness,
    );
}
