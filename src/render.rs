//! Telegram HTML text for alerts and command replies.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use feed_client::{StandingRow, UpcomingMatch};
use match_tracker::{MatchEvent, MatchSnapshot, ScorerSide};
use news_watch::FeedItem;

use crate::notify::Alert;

/// Brasília has been UTC-3 all year since 2019.
const BRASILIA_OFFSET_SECS: i32 = 3 * 3600;

fn brasilia() -> FixedOffset {
    FixedOffset::west_opt(BRASILIA_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn br_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&brasilia()).format("%H:%M").to_string()
}

pub fn br_date_time(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(t) => t.with_timezone(&brasilia()).format("%d/%m %H:%M").to_string(),
        None => "data a definir".to_string(),
    }
}

fn position_marker(pos: u32) -> &'static str {
    match pos {
        0..=4 => "🟢",
        p if p >= 17 => "🔴",
        _ => "⚪",
    }
}

fn footer(instance_id: &str) -> String {
    format!("\n\n<i>FutNews • {}</i>", escape_html(instance_id))
}

// ====================================================================
// Alerts
// ====================================================================

pub fn alert_text(alert: &Alert) -> String {
    match alert {
        Alert::Match(event) => match_event_text(event),
        Alert::News(item) => news_text(item),
    }
}

fn teams(s: &MatchSnapshot) -> (String, String) {
    (escape_html(&s.home_name), escape_html(&s.away_name))
}

fn kickoff_line(s: &MatchSnapshot) -> String {
    match s.kickoff {
        Some(k) => format!("⏰ {} <i>(Brasília)</i>", br_time(k)),
        None => "⏰ horário a definir".to_string(),
    }
}

pub fn match_event_text(event: &MatchEvent) -> String {
    match event {
        MatchEvent::Pregame(s) => {
            let (home, away) = teams(s);
            format!("⏳ <b>FALTAM 10 MINUTOS!</b>\n⚽ {home} vs {away}\n{}", kickoff_line(s))
        }
        MatchEvent::Kickoff(s) => {
            let (home, away) = teams(s);
            format!("🟢 <b>BOLA ROLANDO!</b>\n⚽ {home} vs {away}\n{}", kickoff_line(s))
        }
        MatchEvent::Goal { snapshot, side, .. } => {
            let (home, away) = teams(snapshot);
            let mut text = format!(
                "⚽ <b>PLACAR MUDOU!</b>\n{home} <b>{}</b> {away}",
                snapshot.score_line()
            );
            match side {
                ScorerSide::Home => text.push_str(&format!("\nGol do {home}!")),
                ScorerSide::Away => text.push_str(&format!("\nGol do {away}!")),
                ScorerSide::Unknown => {}
            }
            text
        }
        MatchEvent::FullTime(s) => {
            let (home, away) = teams(s);
            format!("🏁 <b>FIM DE JOGO!</b>\n{home} <b>{}</b> {away}", s.score_line())
        }
    }
}

pub fn news_text(item: &FeedItem) -> String {
    let mut text = format!("📰 <b>{}</b>", escape_html(&item.title));
    if let Some(summary) = &item.summary {
        text.push('\n');
        text.push_str(&escape_html(summary));
    }
    if !item.link.is_empty() {
        text.push_str(&format!("\n\n🔗 {}", escape_html(&item.link)));
    }
    text
}

// ====================================================================
// Command replies
// ====================================================================

pub fn help_text(instance_id: &str) -> String {
    let lines = [
        "🤖 <b>FutNews — Comandos</b>",
        "",
        "• /tabela (ou /tabela 10)",
        "• /rodada",
        "• /aovivo",
        "• /time flamengo",
        "• /ajuda",
        "• /teste",
        "",
        "Também funciona com ! no lugar de /.",
        "",
        "✅ Alertas automáticos: 10 min antes, início, placar, fim e notícias.",
    ];
    format!("{}{}", lines.join("\n"), footer(instance_id))
}

pub fn ping_text(instance_id: &str) -> String {
    format!("✅ FutNews ativo ({})", escape_html(instance_id))
}

pub fn error_text() -> String {
    "⚠️ Deu erro ao executar o comando.".to_string()
}

pub fn standings_text(rows: &[StandingRow], instance_id: &str) -> String {
    let lines: Vec<String> = rows
        .iter()
        .map(|r| {
            let name: String = r.team.display_name().chars().take(18).collect();
            format!(
                "{} {:02}. {:<18} {:>3} pts (PJ {})",
                position_marker(r.position),
                r.position,
                escape_html(&name),
                r.points,
                r.played
            )
        })
        .collect();
    format!(
        "🏆 <b>Brasileirão Série A — Tabela</b>\n<pre>{}</pre>{}",
        lines.join("\n"),
        footer(instance_id)
    )
}

fn fixture_line(m: &UpcomingMatch) -> String {
    format!(
        "• <b>{}</b> — {} vs {}",
        br_date_time(m.kickoff),
        escape_html(&m.home.name),
        escape_html(&m.away.name)
    )
}

pub fn upcoming_text(matches: &[UpcomingMatch], instance_id: &str) -> String {
    if matches.is_empty() {
        return "📅 Não achei próximos jogos nos próximos dias.".to_string();
    }
    let lines: Vec<String> = matches.iter().map(fixture_line).collect();
    format!(
        "📅 <b>Próximos jogos (Brasileirão)</b>\n{}{}",
        lines.join("\n"),
        footer(instance_id)
    )
}

pub fn live_text(matches: &[MatchSnapshot], instance_id: &str) -> String {
    if matches.is_empty() {
        return "🔴 Nenhum jogo ao vivo agora.".to_string();
    }
    let lines: Vec<String> = matches
        .iter()
        .map(|m| {
            let (home, away) = teams(m);
            format!("🔥 <b>{home}</b> {} <b>{away}</b>", m.score_line())
        })
        .collect();
    format!(
        "🔴 <b>Jogos ao vivo (Brasileirão)</b>\n{}{}",
        lines.join("\n"),
        footer(instance_id)
    )
}

pub fn team_not_found_text(query: &str) -> String {
    format!("⚠️ Não achei esse time na tabela: <b>{}</b>", escape_html(query))
}

pub fn team_text(row: &StandingRow, next: &[UpcomingMatch], instance_id: &str) -> String {
    let mut text = format!(
        "📌 <b>{}</b>\n{} Posição: <b>{}º</b> | Pontos: <b>{}</b> | PJ: <b>{}</b>\nV: <b>{}</b>  E: <b>{}</b>  D: <b>{}</b> | SG: <b>{}</b>\n\n",
        escape_html(&row.team.name),
        position_marker(row.position),
        row.position,
        row.points,
        row.played,
        row.won,
        row.draw,
        row.lost,
        row.goal_difference,
    );
    if next.is_empty() {
        text.push_str("📅 <b>Próximos jogos:</b> não encontrei nos próximos 30 dias.");
    } else {
        let lines: Vec<String> = next.iter().map(fixture_line).collect();
        text.push_str(&format!("📅 <b>Próximos jogos:</b>\n{}", lines.join("\n")));
    }
    text.push_str(&footer(instance_id));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use match_tracker::MatchStatus;

    fn snap(home: u32, away: u32) -> MatchSnapshot {
        MatchSnapshot {
            id: 7,
            status: MatchStatus::Live,
            kickoff: Some(Utc.with_ymd_and_hms(2025, 6, 1, 22, 0, 0).unwrap()),
            home_name: "Grêmio".into(),
            away_name: "Atlético <MG>".into(),
            home_score: home,
            away_score: away,
        }
    }

    #[test]
    fn kickoff_is_rendered_in_brasilia_time() {
        let text = match_event_text(&MatchEvent::Kickoff(snap(0, 0)));
        assert!(text.contains("BOLA ROLANDO"));
        assert!(text.contains("19:00"));
        assert!(text.contains("Atlético &lt;MG&gt;"));
    }

    #[test]
    fn goal_names_the_scoring_side() {
        let ev = MatchEvent::Goal {
            snapshot: snap(1, 0),
            side: ScorerSide::Home,
            previous_home: 0,
            previous_away: 0,
        };
        let text = match_event_text(&ev);
        assert!(text.contains("<b>1 x 0</b>"));
        assert!(text.contains("Gol do Grêmio!"));

        let ev = MatchEvent::Goal {
            snapshot: snap(2, 1),
            side: ScorerSide::Unknown,
            previous_home: 1,
            previous_away: 0,
        };
        assert!(!match_event_text(&ev).contains("Gol do"));
    }

    #[test]
    fn news_text_escapes_and_links() {
        let mut item = FeedItem::new("A & B", "https://ge.globo.com/x");
        item.summary = Some("resumo".into());
        let text = news_text(&item);
        assert!(text.starts_with("📰 <b>A &amp; B</b>\nresumo"));
        assert!(text.ends_with("https://ge.globo.com/x"));
    }

    #[test]
    fn missing_kickoff_has_placeholder() {
        assert_eq!(br_date_time(None), "data a definir");
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 2, 30, 0).unwrap();
        assert_eq!(br_date_time(Some(t)), "31/05 23:30");
    }

    #[test]
    fn position_markers() {
        assert_eq!(position_marker(1), "🟢");
        assert_eq!(position_marker(10), "⚪");
        assert_eq!(position_marker(20), "🔴");
    }
}
