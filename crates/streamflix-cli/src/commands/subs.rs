use super::Context;
use crate::output::{new_table, Output};
use color_eyre::Result;
use media_watch_core::{active_cue_at, parse_captions, strip_markup};
use media_watch_models::format_clock;
use media_watch_sources::SubtitleFetcher;
use serde_json::json;

pub async fn run_subs(ctx: &Context, source: &str, at: Option<f64>, output: &Output) -> Result<()> {
    let text = SubtitleFetcher::new()?.fetch(source).await?;
    let cues = parse_captions(&text);
    let strip = ctx.config.subtitles.strip_markup;
    let clean = |text: &str| -> String {
        if strip {
            strip_markup(text).into_owned()
        } else {
            text.to_string()
        }
    };

    if let Some(time) = at {
        let shown = clean(active_cue_at(&cues, time));
        if output.is_human() {
            if shown.is_empty() {
                output.info(format!("No caption at {}", format_clock(time)));
            } else {
                output.info(shown);
            }
        } else {
            output.json(&json!({ "time": time, "text": shown }));
        }
        return Ok(());
    }

    if !output.is_human() {
        let data: Vec<_> = cues
            .iter()
            .map(|cue| json!({ "start": cue.start, "end": cue.end, "text": clean(&cue.text) }))
            .collect();
        output.json(&json!({ "source": source, "cues": data }));
        return Ok(());
    }

    if cues.is_empty() {
        output.warn(format!("No cues found in {}", source));
        return Ok(());
    }
    let mut table = new_table(&["Start", "End", "Text"]);
    for cue in &cues {
        table.add_row(vec![format_clock(cue.start), format_clock(cue.end), clean(&cue.text)]);
    }
    output.heading(&format!("{} cue(s)", cues.len()));
    output.table(&table);
    Ok(())
}
