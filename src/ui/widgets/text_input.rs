use crate::input::InputAction;

use super::super::components::HasClickListener;
use super::super::config::{ComponentConfig, ComponentSize, DEFAULT_COMPONENT_SIZE, WidgetKind};
use super::super::identity::EntityParent;
use super::super::layout_types::pixels;
use super::super::text::HasTextInputState;
use super::super::theme::ColorUsage;
use super::{ElementData, ElementResult, Imm};

/// Extra knobs for [`Imm::text_input`].
#[derive(Default)]
pub struct TextInputConfig {
    /// Maximum length in bytes; 0 = unlimited.
    pub max_length: usize,
    /// Display every codepoint as this character (password fields).
    pub mask_char: Option<char>,
}

impl<A: InputAction> Imm<'_, A> {
    /// Single-line UTF-8 editor bound to `value`.
    ///
    /// `changed` reports edits made through the widget this frame; external
    /// changes to `value` overwrite the widget state.
    pub fn text_input(
        &mut self,
        ep: EntityParent,
        value: &mut String,
        input_config: TextInputConfig,
        mut config: ComponentConfig,
    ) -> ElementResult {
        if config.size.is_default {
            config.size = ComponentSize::new(
                pixels(DEFAULT_COMPONENT_SIZE.0),
                pixels(DEFAULT_COMPONENT_SIZE.1 * 0.8),
            );
        }
        let config = self.resolve_config(WidgetKind::TextInput, config, false);
        let config = if config.color_usage.is_none() {
            config.with_color_usage(ColorUsage::Surface)
        } else {
            config
        };
        self.init_component(ep, &config, "text_input");

        {
            let initial = value.clone();
            let max_length = input_config.max_length;
            if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
                entity.add_component_if_missing(|| HasTextInputState::new(&initial, max_length));
                // Clicking the field gives it focus through the click system.
                entity.add_component_if_missing(|| HasClickListener::new(Box::new(|_, _| {})));
            }
        }

        let Some(state) = self
            .ui
            .get_entity_for_id_mut(ep.0)
            .and_then(|entity| entity.get_mut::<HasTextInputState>())
        else {
            return ElementResult::new(false, ep.0);
        };

        state.max_length = input_config.max_length;
        state.mask_char = input_config.mask_char;

        let changed = std::mem::take(&mut state.changed_since);
        if changed {
            *value = state.text().to_string();
        } else if state.text() != value.as_str() {
            // The host rewrote the bound string; adopt it.
            state.storage = super::super::text::StringStorage::new(value);
            state.clamp_cursor();
        }

        let cursor = state.cursor_position as i64;
        ElementResult::with_data(changed, ep.0, ElementData::Int(cursor))
    }
}
