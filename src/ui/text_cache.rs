use std::collections::HashMap;

use lateshift_derive::Component;

use crate::ecs::Component;
use crate::geometry::Vec2;

pub type MeasureTextFn = Box<dyn FnMut(&str, &str, f32, f32) -> Vec2>;

const DEFAULT_PRUNE_INTERVAL: u32 = 60;
const DEFAULT_MAX_AGE: u32 = 120;
const DEFAULT_MAX_ENTRIES: usize = 4096;

struct CacheEntry {
    size: Vec2,
    last_used_generation: u32,
}

/// Memoizes text measurement behind an FNV-keyed map with generational
/// aging. Register as a singleton on the UI collection and call
/// [`end_frame`](TextMeasureCache::end_frame) once per frame.
#[derive(Component)]
pub struct TextMeasureCache {
    measure_fn: Option<MeasureTextFn>,
    cache: HashMap<u64, CacheEntry>,

    current_generation: u32,
    prune_interval: u32,
    max_age: u32,
    max_entries: usize,

    cache_hits: u64,
    cache_misses: u64,
}

impl Default for TextMeasureCache {
    fn default() -> Self {
        Self {
            measure_fn: None,
            cache: HashMap::new(),
            current_generation: 0,
            prune_interval: DEFAULT_PRUNE_INTERVAL,
            max_age: DEFAULT_MAX_AGE,
            max_entries: DEFAULT_MAX_ENTRIES,
            cache_hits: 0,
            cache_misses: 0,
        }
    }
}

impl TextMeasureCache {
    pub fn new(measure_fn: MeasureTextFn) -> Self {
        Self {
            measure_fn: Some(measure_fn),
            ..Default::default()
        }
    }

    pub fn set_measure_function(&mut self, measure_fn: MeasureTextFn) {
        self.measure_fn = Some(measure_fn);
    }

    pub fn set_prune_interval(&mut self, frames: u32) {
        self.prune_interval = frames;
    }

    pub fn set_max_age(&mut self, frames: u32) {
        self.max_age = frames;
    }

    pub fn set_max_entries(&mut self, count: usize) {
        self.max_entries = count;
    }

    pub fn measure(&mut self, text: &str, font_name: &str, font_size: f32, spacing: f32) -> Vec2 {
        if self.measure_fn.is_none() {
            return Vec2::ZERO;
        }

        let key = compute_hash(text, font_name, font_size, spacing);
        if let Some(entry) = self.cache.get_mut(&key) {
            entry.last_used_generation = self.current_generation;
            self.cache_hits += 1;
            return entry.size;
        }

        self.cache_misses += 1;
        let size = (self.measure_fn.as_mut().unwrap())(font_name, text, font_size, spacing);

        if self.cache.len() >= self.max_entries {
            self.prune_oldest_entries(self.max_entries / 4);
        }

        self.cache.insert(
            key,
            CacheEntry {
                size,
                last_used_generation: self.current_generation,
            },
        );
        size
    }

    pub fn measure_width(&mut self, text: &str, font_name: &str, font_size: f32) -> f32 {
        self.measure(text, font_name, font_size, 1.0).x
    }

    /// Advance the generation; prunes stale entries every `prune_interval`
    /// frames.
    pub fn end_frame(&mut self) {
        self.current_generation += 1;
        if self.prune_interval > 0 && self.current_generation % self.prune_interval == 0 {
            self.prune_stale_entries();
        }
    }

    pub fn prune(&mut self) {
        self.prune_stale_entries();
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.cache_hits
    }

    pub fn misses(&self) -> u64 {
        self.cache_misses
    }

    pub fn generation(&self) -> u32 {
        self.current_generation
    }

    pub fn hit_rate(&self) -> f32 {
        let total = self.cache_hits + self.cache_misses;
        if total > 0 {
            self.cache_hits as f32 / total as f32 * 100.0
        } else {
            0.0
        }
    }

    fn prune_stale_entries(&mut self) {
        if self.current_generation < self.max_age {
            return;
        }
        let threshold = self.current_generation - self.max_age;
        self.cache
            .retain(|_, entry| entry.last_used_generation >= threshold);
    }

    fn prune_oldest_entries(&mut self, count: usize) {
        if count == 0 || self.cache.is_empty() {
            return;
        }

        let total_age: u64 = self
            .cache
            .values()
            .map(|entry| (self.current_generation - entry.last_used_generation) as u64)
            .sum();
        let avg_age = (total_age / self.cache.len() as u64) as u32;
        let threshold = self.current_generation.saturating_sub(avg_age);

        let mut removed = 0;
        self.cache.retain(|_, entry| {
            if removed < count && entry.last_used_generation < threshold {
                removed += 1;
                false
            } else {
                true
            }
        });
    }
}

/// FNV-1a over the measurement inputs.
fn compute_hash(text: &str, font_name: &str, font_size: f32, spacing: f32) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for byte in text.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash ^= 0xFF;
    hash = hash.wrapping_mul(FNV_PRIME);

    for byte in font_name.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    for byte in font_size.to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    for byte in spacing.to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    hash
}
