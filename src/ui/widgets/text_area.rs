use crate::input::InputAction;

use super::super::components::{HasClickListener, HasScrollView};
use super::super::config::{ComponentConfig, ComponentSize, DEFAULT_COMPONENT_SIZE, WidgetKind};
use super::super::identity::EntityParent;
use super::super::layout_types::pixels;
use super::super::text::{HasTextAreaState, StringStorage};
use super::super::theme::ColorUsage;
use super::{ElementData, ElementResult, Imm};

impl<A: InputAction> Imm<'_, A> {
    /// Multi-line editor bound to `value`. Up/Down moves by row keeping a
    /// preferred column; the viewport scrolls to follow the cursor.
    pub fn text_area(
        &mut self,
        ep: EntityParent,
        value: &mut String,
        mut config: ComponentConfig,
    ) -> ElementResult {
        if config.size.is_default {
            config.size = ComponentSize::new(
                pixels(DEFAULT_COMPONENT_SIZE.0 * 1.5),
                pixels(DEFAULT_COMPONENT_SIZE.1 * 3.0),
            );
        }
        let config = self.resolve_config(WidgetKind::TextArea, config, false);
        let config = if config.color_usage.is_none() {
            config.with_color_usage(ColorUsage::Surface)
        } else {
            config
        };
        self.init_component(ep, &config, "text_area");

        {
            let initial = value.clone();
            if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
                entity.add_component_if_missing(|| HasTextAreaState::new(&initial));
                entity.add_component_if_missing(|| HasClickListener::new(Box::new(|_, _| {})));
                // Overflow past the viewport is expected here.
                entity.add_component_if_missing(HasScrollView::default);
            }
        }

        let Some(area) = self
            .ui
            .get_entity_for_id_mut(ep.0)
            .and_then(|entity| entity.get_mut::<HasTextAreaState>())
        else {
            return ElementResult::new(false, ep.0);
        };

        let changed = std::mem::take(&mut area.input.changed_since);
        if changed {
            *value = area.text().to_string();
        } else if area.text() != value.as_str() {
            area.input.storage = StringStorage::new(value);
            area.input.clamp_cursor();
            area.rebuild_line_index();
        }

        let row = area.cursor_position_rc().row as i64;
        ElementResult::with_data(changed, ep.0, ElementData::Int(row))
    }
}
