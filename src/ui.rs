use crate::models::User;
use crate::progress::ProgressSettings;
use std::fmt::Write;

const RECENT_ENTRIES: usize = 5;

pub fn render_index(users: &[User], settings: &ProgressSettings) -> String {
    let options = users.iter().fold(String::new(), |mut out, user| {
        let name = escape_html(&user.name);
        let _ = write!(out, r#"<option value="{name}">{name}</option>"#);
        out
    });

    INDEX_HTML
        .replace("{{GOAL}}", &format_miles(settings.goal_miles))
        .replace("{{WINDOW_START}}", &settings.window.start.format("%b %-d").to_string())
        .replace("{{WINDOW_END}}", &settings.window.end.format("%b %-d, %Y").to_string())
        .replace("{{USER_OPTIONS}}", &options)
        .replace("{{PROGRESS}}", &render_progress(users, settings))
}

/// The `#progress` section on its own, swapped in after each logged entry.
pub fn render_progress(users: &[User], settings: &ProgressSettings) -> String {
    let mut out = String::from(r#"<section id="progress" class="progress">"#);
    if users.is_empty() {
        out.push_str(r#"<p class="hint">No one is tracking miles yet.</p>"#);
    }
    for user in users {
        render_user(&mut out, user, settings);
    }
    out.push_str("</section>");
    out
}

fn render_user(out: &mut String, user: &User, settings: &ProgressSettings) {
    let name = escape_html(&user.name);
    let _ = write!(
        out,
        r#"<article class="user" data-user="{name}">
  <header>
    <h2>{name}</h2>
    <span class="total">{total} / {goal} mi</span>
  </header>
  <div class="bar" role="img" aria-label="{name}: {walk_pct}% walked, {run_pct}% run">
    <span class="bar-walk" style="width: {walk_pct}%"></span>
    <span class="bar-run" style="width: {run_pct}%"></span>
  </div>
  <dl class="split">
    <div><dt>Walks</dt><dd>{walks} &middot; {walk_miles} mi &middot; {walk_pct}%</dd></div>
    <div><dt>Runs</dt><dd>{runs} &middot; {run_miles} mi &middot; {run_pct}%</dd></div>
    <div><dt>Needed per day</dt><dd>{daily} mi</dd></div>
  </dl>
"#,
        total = format_miles(user.miles),
        goal = format_miles(settings.goal_miles),
        walk_pct = format_pct(user.walk_pct),
        run_pct = format_pct(user.run_pct),
        walks = user.walks,
        runs = user.runs,
        walk_miles = format_miles(user.walk_miles),
        run_miles = format_miles(user.run_miles),
        daily = format_miles(user.daily_avg_required),
    );

    if !user.activity_log.is_empty() {
        out.push_str(r#"  <ol class="recent">"#);
        for entry in user.activity_log.iter().rev().take(RECENT_ENTRIES) {
            let _ = write!(out, "<li>{}</li>", escape_html(entry));
        }
        out.push_str("</ol>\n");
    }
    out.push_str("</article>");
}

fn format_miles(value: f64) -> String {
    format!("{value:.2}")
}

fn format_pct(value: f64) -> String {
    format!("{value:.1}")
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mileage Tracker</title>
  <link rel="stylesheet" href="/static/style.css" />
</head>
<body>
  <main class="app">
    <header>
      <h1>Mileage Tracker</h1>
      <p class="subtitle">{{GOAL}} miles each, {{WINDOW_START}} &ndash; {{WINDOW_END}}.</p>
    </header>

    <form id="log-form" class="log-form" method="post" action="/log">
      <label>
        <span class="label">Who</span>
        <select name="name" required>{{USER_OPTIONS}}</select>
      </label>
      <label>
        <span class="label">Distance</span>
        <input name="distance" type="number" min="0" step="0.01" required />
      </label>
      <label>
        <span class="label">Unit</span>
        <select name="unit">
          <option value="miles">miles</option>
          <option value="kilometers">kilometers</option>
        </select>
      </label>
      <label>
        <span class="label">Activity</span>
        <select name="activity">
          <option value="walk">walk</option>
          <option value="run">run</option>
        </select>
      </label>
      <button type="submit">Log it</button>
      <p id="status" class="status" aria-live="polite"></p>
    </form>

    {{PROGRESS}}
  </main>

  <script>
    const form = document.getElementById('log-form');
    const statusEl = document.getElementById('status');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type;
    };

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      setStatus('Saving...', 'info');
      try {
        const response = await fetch('/log', {
          method: 'POST',
          body: new URLSearchParams(new FormData(form)),
        });
        const body = await response.text();
        if (!response.ok) {
          setStatus(body || `Request failed (${response.status})`, 'error');
          return;
        }
        document.getElementById('progress').outerHTML = body;
        form.elements.distance.value = '';
        setStatus('Logged.', 'ok');
      } catch (err) {
        setStatus('Network error, try again.', 'error');
      }
    });
  </script>
</body>
</html>
"#;
