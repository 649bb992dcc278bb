//! Partial configuration carrier merged by `FrameScheduler::configure`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::FaultPolicy;
use crate::scheduler::{ParseFn, StepContext, StepFn};

/// A partial `ScheduleConfig`: every field is optional and only supplied fields
/// are merged. Built fluently, or extracted permissively from JSON with
/// [`ScheduleOptions::from_json`].
pub struct ScheduleOptions<T> {
    pub speed: Option<u32>,
    pub auto_run: Option<bool>,
    pub looped: Option<bool>,
    pub fault_policy: Option<FaultPolicy>,
    pub data: Option<Vec<T>>,
    pub parse: Option<ParseFn<T>>,
    pub step: Option<StepFn<T>>,
    pub cache: Option<Value>,
}

impl<T> Default for ScheduleOptions<T> {
    fn default() -> Self {
        Self {
            speed: None,
            auto_run: None,
            looped: None,
            fault_policy: None,
            data: None,
            parse: None,
            step: None,
            cache: None,
        }
    }
}

impl<T> ScheduleOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target logical steps per second; snapped to the ladder on merge.
    pub fn speed(mut self, speed: u32) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Start as soon as a step function is bound.
    pub fn auto_run(mut self, auto_run: bool) -> Self {
        self.auto_run = Some(auto_run);
        self
    }

    /// Restart the sequence after each completed pass.
    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = Some(looped);
        self
    }

    /// Panic handling for hooks and the step function.
    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = Some(policy);
        self
    }

    /// Bind the iteration sequence, replacing any previous binding.
    pub fn data(mut self, data: Vec<T>) -> Self {
        self.data = Some(data);
        self
    }

    /// Per-step transform applied to the current item before the step function
    /// sees it.
    pub fn parse(mut self, parse: impl FnMut(&T) -> T + 'static) -> Self {
        self.parse = Some(Box::new(parse));
        self
    }

    /// The step function executed once per logical step.
    pub fn step(mut self, step: impl FnMut(&mut StepContext<'_, T>) + 'static) -> Self {
        self.step = Some(Box::new(step));
        self
    }

    /// Opaque user value carried by the scheduler, never interpreted by it.
    pub fn cache(mut self, cache: Value) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl<T: DeserializeOwned> ScheduleOptions<T> {
    /// Permissive extraction from wire-format JSON.
    ///
    /// Recognized keys are `"speed"`, `"autoRun"`, `"loop"`, `"data"` and
    /// `"cache"`. A key whose value has the wrong JSON kind is ignored rather
    /// than reported; rejections leave a warn-level breadcrumb. Step and parse
    /// functions cannot travel as JSON and are never extracted here.
    pub fn from_json(value: &Value) -> Self {
        let mut opts = Self::new();
        let Some(map) = value.as_object() else {
            log::warn!("ignoring non-object schedule options: {value}");
            return opts;
        };

        for (key, val) in map {
            match key.as_str() {
                "speed" => match val.as_u64() {
                    Some(speed) => opts.speed = Some(speed.min(u32::MAX as u64) as u32),
                    None => log::warn!("ignoring non-numeric speed: {val}"),
                },
                "autoRun" => match val.as_bool() {
                    Some(auto_run) => opts.auto_run = Some(auto_run),
                    None => log::warn!("ignoring non-boolean autoRun: {val}"),
                },
                "loop" => match val.as_bool() {
                    Some(looped) => opts.looped = Some(looped),
                    None => log::warn!("ignoring non-boolean loop: {val}"),
                },
                "data" => {
                    if !val.is_array() {
                        log::warn!("ignoring non-sequence data binding");
                        continue;
                    }
                    match serde_json::from_value::<Vec<T>>(val.clone()) {
                        Ok(data) => opts.data = Some(data),
                        Err(err) => log::warn!("ignoring undeserializable data binding: {err}"),
                    }
                }
                "cache" => opts.cache = Some(val.clone()),
                other => log::warn!("ignoring unknown schedule option {other:?}"),
            }
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_extracts_matching_kinds() {
        let opts: ScheduleOptions<u32> = ScheduleOptions::from_json(&json!({
            "speed": 25,
            "autoRun": true,
            "loop": false,
            "data": [1, 2, 3],
            "cache": {"frame": 0},
        }));
        assert_eq!(opts.speed, Some(25));
        assert_eq!(opts.auto_run, Some(true));
        assert_eq!(opts.looped, Some(false));
        assert_eq!(opts.data, Some(vec![1, 2, 3]));
        assert_eq!(opts.cache, Some(json!({"frame": 0})));
    }

    #[test]
    fn from_json_ignores_mismatched_kinds() {
        let opts: ScheduleOptions<u32> = ScheduleOptions::from_json(&json!({
            "speed": "fast",
            "autoRun": 1,
            "loop": "yes",
            "data": "not-a-sequence",
        }));
        assert_eq!(opts.speed, None);
        assert_eq!(opts.auto_run, None);
        assert_eq!(opts.looped, None);
        assert!(opts.data.is_none());
    }

    #[test]
    fn from_json_ignores_undeserializable_elements() {
        let opts: ScheduleOptions<u32> = ScheduleOptions::from_json(&json!({
            "data": [1, "two", 3],
        }));
        assert!(opts.data.is_none());
    }
}
