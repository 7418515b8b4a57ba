use serde::{Deserialize, Serialize};
use smk_db::models::{GamePoints, QuizStats, StudySession};
use smk_srs::{
    MasteryTally,
    points::{FREE_STUDY_SESSION_POINTS, intensity_points, scale_points, streak_bonus},
};

/// Points breakdown of one user on one notebook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookPoints {
    #[serde(rename = "puntosRepasoInteligente")]
    pub smart_review: i64,
    #[serde(rename = "puntosEstudioActivo")]
    pub active_study: i64,
    #[serde(rename = "puntosEstudioLibre")]
    pub free_study: i64,
    #[serde(rename = "puntosQuiz")]
    pub quiz: i64,
    #[serde(rename = "puntosJuegos")]
    pub games: i64,
    #[serde(rename = "bonusRacha")]
    pub streak_bonus: i64,
    pub score: i64,
    /// Share of dominated concepts; informational, not part of `score`
    #[serde(rename = "porcentajeDominio")]
    pub mastery_percentage: u32,
}

impl NotebookPoints {
    /// Combine the raw inputs into a breakdown.
    ///
    /// `smart` must already be restricted to validated sessions.
    pub fn compute(
        smart: &[StudySession],
        voice: &[StudySession],
        free: &[StudySession],
        quiz: Option<&QuizStats>,
        games: GamePoints,
        streak_days: u32,
        tally: &MasteryTally,
    ) -> Self {
        let smart_raw: f64 = smart
            .iter()
            .map(|s| intensity_points(s.intensity.as_deref()))
            .sum();
        let voice_raw: f64 = voice
            .iter()
            .map(|s| s.final_session_score.or(s.session_score).unwrap_or(0.0))
            .sum();
        let free_raw = free.len() as f64 * FREE_STUDY_SESSION_POINTS;

        let mut points = Self {
            smart_review: scale_points(smart_raw),
            active_study: scale_points(voice_raw),
            free_study: scale_points(free_raw),
            quiz: quiz.map_or(0, |q| q.max_score),
            games: games.total_points,
            streak_bonus: streak_bonus(streak_days),
            score: 0,
            mastery_percentage: tally.dominated_percentage(),
        };
        points.score = points.smart_review
            + points.active_study
            + points.free_study
            + points.quiz
            + points.games
            + points.streak_bonus;
        points
    }
}
