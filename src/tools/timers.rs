//! Timers, alarms and reminders
//!
//! Every tool here validates its arguments, starts a background worker and
//! returns right away. The worker waits cooperatively and reports through
//! notices, so `stop` ends all pending timers within one poll interval.

use chrono::{DateTime, Datelike, Local, NaiveTime, Timelike, Weekday};
use serde_json::json;
use tracing::debug;

use crate::core::types::Arguments;
use crate::tools::args::{optional_str, optional_u64, required_str};
use crate::tools::duration::{looks_like_duration, parse_duration, parse_duration_secs};
use crate::tools::registry::CapabilityRegistry;
use crate::tools::{ToolContext, ToolError, ToolResult, ToolSpec};

pub fn register(registry: &mut CapabilityRegistry) {
    registry.register(
        ToolSpec::new(
            "set_timer",
            "Set a timer for a specified duration.",
            json!({
                "type": "object",
                "properties": {
                    "duration": {"type": "string", "description": "Duration in format: '1h30m', '45m', '90s'"},
                    "message": {"type": "string", "description": "Optional message to show when timer completes"}
                },
                "required": ["duration"]
            }),
        ),
        set_timer,
    );
    registry.register(
        ToolSpec::new(
            "set_alarm",
            "Set an alarm for a specific time.",
            json!({
                "type": "object",
                "properties": {
                    "alarm_time": {"type": "string", "description": "Time in 24-hour format (HH:MM)"},
                    "message": {"type": "string", "description": "Optional message to show when alarm triggers"}
                },
                "required": ["alarm_time"]
            }),
        ),
        set_alarm,
    );
    registry.register(
        ToolSpec::new(
            "set_reminder",
            "Set a reminder for a specific time or after duration.",
            json!({
                "type": "object",
                "properties": {
                    "remind_time": {"type": "string", "description": "Time (HH:MM) or duration (1h30m)"},
                    "message": {"type": "string", "description": "Reminder message"}
                },
                "required": ["remind_time", "message"]
            }),
        ),
        set_reminder,
    );
    registry.register(
        ToolSpec::new(
            "set_recurring_reminder",
            "Set a recurring reminder.",
            json!({
                "type": "object",
                "properties": {
                    "schedule_time": {"type": "string", "description": "Time in 24-hour format (HH:MM)"},
                    "message": {"type": "string", "description": "Reminder message"},
                    "frequency": {"type": "string", "enum": ["daily", "hourly", "weekly", "workdays"]}
                },
                "required": ["schedule_time", "message"]
            }),
        ),
        set_recurring_reminder,
    );
    registry.register(
        ToolSpec::new(
            "set_pomodoro_timer",
            "Set up a Pomodoro timer for focused work sessions.",
            json!({
                "type": "object",
                "properties": {
                    "work_duration": {"type": "string", "description": "Work period duration (default: 25m)"},
                    "break_duration": {"type": "string", "description": "Break period duration (default: 5m)"},
                    "cycles": {"type": "integer", "description": "Number of work/break cycles (default: 4)"}
                }
            }),
        ),
        set_pomodoro_timer,
    );
    registry.register(
        ToolSpec::new(
            "countdown_timer",
            "Create a countdown timer with visual feedback.",
            json!({
                "type": "object",
                "properties": {
                    "duration": {"type": "string", "description": "Countdown duration (e.g., '5m', '1h30m')"},
                    "title": {"type": "string", "description": "Optional timer title"}
                },
                "required": ["duration"]
            }),
        ),
        countdown_timer,
    );
}

/// How often a recurring reminder fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Hourly,
    Weekly,
    Workdays,
}

impl Frequency {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Frequency::Daily),
            "hourly" => Some(Frequency::Hourly),
            "weekly" => Some(Frequency::Weekly),
            "workdays" => Some(Frequency::Workdays),
            _ => None,
        }
    }

    /// First firing strictly after `now`
    ///
    /// Hourly reminders fire on the hour and ignore `time`; weekly ones fire
    /// on the weekday the reminder was created.
    pub fn next_after(
        &self,
        time: NaiveTime,
        now: DateTime<Local>,
        anchor: Weekday,
    ) -> Option<DateTime<Local>> {
        match self {
            Frequency::Hourly => {
                let hour = now
                    .date_naive()
                    .and_hms_opt(now.hour(), 0, 0)?
                    .checked_add_signed(chrono::Duration::hours(1))?;
                hour.and_local_timezone(Local).earliest()
            }
            Frequency::Daily => next_matching(time, now, |_| true),
            Frequency::Weekly => next_matching(time, now, |day| day == anchor),
            Frequency::Workdays => {
                next_matching(time, now, |day| !matches!(day, Weekday::Sat | Weekday::Sun))
            }
        }
    }
}

/// Next time-of-day `time` after `now` on a day accepted by `accept`
fn next_matching(
    time: NaiveTime,
    now: DateTime<Local>,
    accept: impl Fn(Weekday) -> bool,
) -> Option<DateTime<Local>> {
    let today = now.date_naive();
    (0..=7u64)
        .filter_map(|offset| today.checked_add_days(chrono::Days::new(offset)))
        .filter(|date| accept(date.weekday()))
        .filter_map(|date| date.and_time(time).and_local_timezone(Local).earliest())
        .find(|candidate| *candidate > now)
}

/// Next occurrence of a clock time, today or tomorrow
pub fn next_occurrence(time: NaiveTime, now: DateTime<Local>) -> Option<DateTime<Local>> {
    next_matching(time, now, |_| true)
}

pub fn parse_clock_time(name: &'static str, value: &str) -> Result<NaiveTime, ToolError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ToolError::invalid(name, format!("expected HH:MM, got '{}'", value)))
}

fn positive_duration(name: &'static str, value: &str) -> Result<std::time::Duration, ToolError> {
    if parse_duration_secs(value) == 0 {
        return Err(ToolError::invalid(
            name,
            format!("'{}' has no h/m/s components", value),
        ));
    }
    Ok(parse_duration(value))
}

fn no_occurrence(name: &'static str) -> ToolError {
    ToolError::invalid(name, "time does not occur in the local time zone")
}

pub fn set_timer(ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let duration_text = required_str(args, "duration")?;
    let message = optional_str(args, "message")?
        .unwrap_or("Timer finished!")
        .to_string();
    let duration = positive_duration("duration", duration_text)?;
    debug!(duration = duration_text, message = %message, "Setting timer");

    ctx.spawn_background("timer", move |ctx| {
        if ctx.sleep(duration) {
            ctx.notify("Timer Complete", message);
        }
    })?;
    Ok(true)
}

pub fn set_alarm(ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let alarm_time = parse_clock_time("alarm_time", required_str(args, "alarm_time")?)?;
    let message = optional_str(args, "message")?.unwrap_or("Alarm!").to_string();
    let target = next_occurrence(alarm_time, Local::now()).ok_or_else(|| no_occurrence("alarm_time"))?;
    debug!(target = %target, message = %message, "Setting alarm");

    ctx.spawn_background("alarm", move |ctx| {
        if ctx.wait_until(target) {
            ctx.notify("Alarm", message);
        }
    })?;
    Ok(true)
}

pub fn set_reminder(ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let remind_time = required_str(args, "remind_time")?;
    let message = required_str(args, "message")?.to_string();

    let now = Local::now();
    let target = if looks_like_duration(remind_time) {
        let delay = positive_duration("remind_time", remind_time)?;
        let delay = chrono::Duration::from_std(delay)
            .map_err(|e| ToolError::invalid("remind_time", e.to_string()))?;
        now.checked_add_signed(delay)
            .ok_or_else(|| ToolError::invalid("remind_time", "too far in the future"))?
    } else {
        let time = parse_clock_time("remind_time", remind_time)?;
        next_occurrence(time, now).ok_or_else(|| no_occurrence("remind_time"))?
    };
    debug!(target = %target, message = %message, "Setting reminder");

    ctx.spawn_background("reminder", move |ctx| {
        if ctx.wait_until(target) {
            ctx.notify("Reminder", message);
        }
    })?;
    Ok(true)
}

pub fn set_recurring_reminder(ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let schedule_time = parse_clock_time("schedule_time", required_str(args, "schedule_time")?)?;
    let message = required_str(args, "message")?.to_string();
    let frequency_text = optional_str(args, "frequency")?.unwrap_or("daily");
    let Some(frequency) = Frequency::parse(frequency_text) else {
        debug!(frequency = frequency_text, "Unsupported reminder frequency");
        return Ok(false);
    };
    let anchor = Local::now().weekday();
    debug!(?frequency, time = %schedule_time, message = %message, "Setting recurring reminder");

    ctx.spawn_background("recurring-reminder", move |ctx| loop {
        let Some(next) = frequency.next_after(schedule_time, Local::now(), anchor) else {
            break;
        };
        if !ctx.wait_until(next) {
            break;
        }
        ctx.notify("Recurring Reminder", message.clone());
    })?;
    Ok(true)
}

pub fn set_pomodoro_timer(ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let work = positive_duration(
        "work_duration",
        optional_str(args, "work_duration")?.unwrap_or("25m"),
    )?;
    let rest = positive_duration(
        "break_duration",
        optional_str(args, "break_duration")?.unwrap_or("5m"),
    )?;
    let cycles = optional_u64(args, "cycles")?.unwrap_or(4);
    if cycles == 0 {
        return Err(ToolError::invalid("cycles", "must be at least 1"));
    }
    debug!(?work, ?rest, cycles, "Starting pomodoro timer");

    ctx.spawn_background("pomodoro", move |ctx| {
        for cycle in 1..=cycles {
            if !ctx.sleep(work) {
                return;
            }
            ctx.notify(
                "Pomodoro Timer",
                format!("Time for a break! Cycle {}/{} completed", cycle, cycles),
            );
            if cycle < cycles {
                if !ctx.sleep(rest) {
                    return;
                }
                ctx.notify("Pomodoro Timer", "Break over! Time to work");
            }
        }
    })?;
    Ok(true)
}

pub fn countdown_timer(ctx: &ToolContext, args: &Arguments) -> ToolResult {
    let duration_text = required_str(args, "duration")?;
    let title = optional_str(args, "title")?.unwrap_or("Countdown").to_string();
    let duration = positive_duration("duration", duration_text)?;

    ctx.notify(title.clone(), format!("Time remaining: {}", format_remaining(duration)));
    ctx.spawn_background("countdown", move |ctx| {
        if ctx.sleep(duration) {
            ctx.notify(title, "Countdown Complete!");
        }
    })?;
    Ok(true)
}

fn format_remaining(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
