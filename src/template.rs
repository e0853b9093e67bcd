use chrono::{Datelike, NaiveDate};

/// Render a path template for a single calendar day.
///
/// Supported placeholders: `:bucket`, `:year`, `:month`, `:day`.
/// Month and day are zero-padded to two digits.
pub fn render_day(template: &str, bucket: &str, date: NaiveDate) -> String {
    render(
        template,
        bucket,
        date.year(),
        Some(date.month()),
        Some(date.day()),
    )
}

/// Render a path template for a whole month. Templates passed here are
/// expected not to contain `:day`.
pub fn render_month(template: &str, bucket: &str, year: i32, month: u32) -> String {
    render(template, bucket, year, Some(month), None)
}

/// Render a path template that only uses the `:bucket` placeholder,
/// e.g. a per-bucket cache root.
pub fn render_bucket(template: &str, bucket: &str) -> String {
    template.replace(":bucket", bucket)
}

fn render(template: &str, bucket: &str, year: i32, month: Option<u32>, day: Option<u32>) -> String {
    let mut rendered = template
        .replace(":bucket", bucket)
        .replace(":year", &year.to_string());
    if let Some(month) = month {
        rendered = rendered.replace(":month", &format!("{:02}", month));
    }
    if let Some(day) = day {
        rendered = rendered.replace(":day", &format!("{:02}", day));
    }
    rendered
}
