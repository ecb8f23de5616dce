//! Human-readable feedback and recommendations, in pt-BR or en-US.

use crate::report::{
    AcousticMetrics, FeedbackCategory, FeedbackItem, ProfileSummary, RateClassification, Severity,
    TextComparisonResult, TranscriptAnalysis,
};
use crate::text::Language;

const MANY_PAUSES_RATIO: f64 = 0.3;
const FEW_PAUSES_RATIO: f64 = 0.1;
/// Clips shorter than this are not told they pause too little.
const FEW_PAUSES_MIN_DURATION: f64 = 10.0;
const REPETITIVE_TTR: f64 = 0.4;
const VARIED_TTR: f64 = 0.7;
const HIGH_FILLER_RATIO: f64 = 0.1;
const COMPLEX_WORDS_RATIO: f64 = 0.15;
const FLUENCY_EXCELLENT: f64 = 80.0;
const FLUENCY_GOOD: f64 = 60.0;
const MAX_REPETITIONS: usize = 3;
const MAX_SELF_CORRECTIONS: usize = 2;
const STEADY_PACING: f64 = 80.0;
const CLEAR_SPEECH: f64 = 80.0;
const UNCLEAR_SPEECH: f64 = 60.0;
const GOOD_PRONUNCIATION: f64 = 75.0;

/// Everything the templates look at.
pub struct FeedbackInput<'a> {
    pub language: Language,
    pub profile: &'a ProfileSummary,
    pub acoustic: &'a AcousticMetrics,
    pub transcript: Option<&'a TranscriptAnalysis>,
    pub comparison: Option<&'a TextComparisonResult>,
    pub transcription_failed: bool,
    pub max_acceptable_pause: f64,
}

#[derive(Debug, Default)]
pub struct Feedback {
    pub items: Vec<FeedbackItem>,
    pub recommendations: Vec<String>,
}

struct Collector {
    language: Language,
    out: Feedback,
}

impl Collector {
    fn pick(&self, pt: String, en: String) -> String {
        match self.language {
            Language::PortugueseBr => pt,
            Language::EnglishUs => en,
        }
    }

    fn say(
        &mut self,
        category: FeedbackCategory,
        severity: Severity,
        pt: impl Into<String>,
        en: impl Into<String>,
    ) {
        let message = self.pick(pt.into(), en.into());
        self.out.items.push(FeedbackItem::new(category, severity, message));
    }

    fn recommend(&mut self, pt: impl Into<String>, en: impl Into<String>) {
        let message = self.pick(pt.into(), en.into());
        self.out.recommendations.push(message);
    }
}

/// One-line verdict on the rate against the profile band.
pub fn profile_rate_message(language: Language, wpm: f64, profile: &ProfileSummary) -> String {
    let (min, max) = (profile.ideal_min_wpm, profile.ideal_max_wpm);
    let en = language == Language::EnglishUs;
    if profile.is_within_range {
        if en {
            format!("Excellent! Your pace of {wpm:.0} WPM is ideal for {}.", profile.name)
        } else {
            format!("Excelente! Sua velocidade de {wpm:.0} PPM está ideal para {}.", profile.name)
        }
    } else if wpm < min {
        let diff = min - wpm;
        if en {
            format!("A bit slow. Try speeding up by about {diff:.0} WPM to reach the ideal {min:.0}-{max:.0} WPM range.")
        } else {
            format!("Um pouco devagar. Tente acelerar cerca de {diff:.0} PPM para ficar na faixa ideal de {min:.0}-{max:.0} PPM.")
        }
    } else {
        let diff = wpm - max;
        if en {
            format!("A bit fast. Try slowing down by about {diff:.0} WPM to reach the ideal {min:.0}-{max:.0} WPM range.")
        } else {
            format!("Um pouco rápido. Tente diminuir cerca de {diff:.0} PPM para ficar na faixa ideal de {min:.0}-{max:.0} PPM.")
        }
    }
}

pub fn build(input: &FeedbackInput<'_>) -> Feedback {
    let mut c = Collector {
        language: input.language,
        out: Feedback::default(),
    };

    if let Some(transcript) = input.transcript {
        let confidence = transcript.language.confidence * 100.0;
        c.say(
            FeedbackCategory::Language,
            Severity::Info,
            format!("Idioma: Português (confiança: {confidence:.0}%)"),
            format!("Language: English (confidence: {confidence:.0}%)"),
        );
    }

    rate_feedback(&mut c, input);
    pause_feedback(&mut c, input);
    pacing_feedback(&mut c, input.acoustic);

    if let Some(transcript) = input.transcript {
        vocabulary_feedback(&mut c, transcript);
        fluency_feedback(&mut c, transcript);
    } else if input.transcription_failed {
        c.say(
            FeedbackCategory::Transcription,
            Severity::Warning,
            "Transcrição indisponível: vocabulário, fluência e pronúncia não foram avaliados.",
            "Transcription unavailable: vocabulary, fluency and pronunciation were not assessed.",
        );
    }

    if let Some(comparison) = input.comparison {
        comparison_feedback(&mut c, comparison);
    }

    c.out
}

fn rate_feedback(c: &mut Collector, input: &FeedbackInput<'_>) {
    let rate = &input.acoustic.speech_rate;
    let severity = if input.profile.is_within_range {
        Severity::Success
    } else {
        Severity::Warning
    };
    let message = profile_rate_message(c.language, rate.words_per_minute, input.profile);
    c.out
        .items
        .push(FeedbackItem::new(FeedbackCategory::Rate, severity, message));

    match rate.classification {
        RateClassification::TooSlow => c.say(
            FeedbackCategory::Rate,
            Severity::Warning,
            "Sua velocidade de fala está muito lenta. Tente aumentar o ritmo para manter o engajamento.",
            "Your speech rate is too slow. Try increasing your pace to maintain engagement.",
        ),
        RateClassification::Slow => c.say(
            FeedbackCategory::Rate,
            Severity::Warning,
            "Sua fala está um pouco lenta. Considere um ritmo ligeiramente mais rápido.",
            "Your speech is a bit slow. Consider a slightly faster pace.",
        ),
        RateClassification::Optimal => c.say(
            FeedbackCategory::Rate,
            Severity::Success,
            "Sua velocidade de fala está na faixa ideal.",
            "Your speech rate is in the ideal range.",
        ),
        RateClassification::Fast => c.say(
            FeedbackCategory::Rate,
            Severity::Warning,
            "Sua fala está um pouco rápida. Considere desacelerar para melhor compreensão.",
            "Your speech is a bit fast. Consider slowing down for better comprehension.",
        ),
        RateClassification::TooFast => c.say(
            FeedbackCategory::Rate,
            Severity::Warning,
            "Sua velocidade de fala está muito rápida. Reduza o ritmo significativamente.",
            "Your speech rate is too fast. Significantly reduce your pace.",
        ),
    }

    match rate.classification {
        RateClassification::TooSlow | RateClassification::Slow => c.recommend(
            "Considere acelerar levemente para manter o engajamento.",
            "Consider speeding up slightly to keep your audience engaged.",
        ),
        RateClassification::Fast | RateClassification::TooFast => c.recommend(
            "Tente desacelerar um pouco para melhor compreensão.",
            "Try slowing down a little for better comprehension.",
        ),
        RateClassification::Optimal => {}
    }
}

fn pause_feedback(c: &mut Collector, input: &FeedbackInput<'_>) {
    let pauses = &input.acoustic.pauses;
    if pauses.pause_ratio > MANY_PAUSES_RATIO {
        c.say(
            FeedbackCategory::Pauses,
            Severity::Warning,
            "Você está fazendo muitas pausas longas. Tente manter um fluxo mais consistente.",
            "You're making too many long pauses. Try to maintain a more consistent flow.",
        );
        c.recommend(
            "Tente reduzir as pausas para maior fluidez.",
            "Try reducing pauses for a smoother delivery.",
        );
    } else if pauses.pause_ratio < FEW_PAUSES_RATIO
        && input.acoustic.duration_seconds > FEW_PAUSES_MIN_DURATION
    {
        c.say(
            FeedbackCategory::Pauses,
            Severity::Info,
            "Você está fazendo poucas pausas. Adicione mais pausas para dar ritmo e permitir absorção.",
            "You're making too few pauses. Add more pauses for rhythm and absorption.",
        );
        c.recommend(
            "Pausas estratégicas ajudam na compreensão.",
            "Strategic pauses help comprehension.",
        );
    } else {
        c.say(
            FeedbackCategory::Pauses,
            Severity::Success,
            "Bom uso de pausas! Elas ajudam na compreensão.",
            "Good use of pauses! They help with comprehension.",
        );
    }

    if pauses.longest_pause > input.max_acceptable_pause {
        let longest = pauses.longest_pause;
        c.say(
            FeedbackCategory::Pauses,
            Severity::Warning,
            format!("Pausa longa detectada: {longest:.1}s"),
            format!("Long pause detected: {longest:.1}s"),
        );
    }
}

fn pacing_feedback(c: &mut Collector, acoustic: &AcousticMetrics) {
    let pacing = &acoustic.pacing;
    if pacing.has_significant_variation {
        let cv = pacing.variation_coefficient;
        c.say(
            FeedbackCategory::Pacing,
            Severity::Warning,
            format!("Ritmo irregular: a velocidade variou {cv:.0}% ao longo da fala."),
            format!("Uneven pacing: your rate varied by {cv:.0}% across the recording."),
        );
        c.recommend(
            "Procure manter um ritmo constante do início ao fim.",
            "Aim for a steady pace from start to finish.",
        );
    } else if pacing.consistency_score >= STEADY_PACING {
        c.say(
            FeedbackCategory::Pacing,
            Severity::Success,
            "Ritmo consistente ao longo da fala.",
            "Consistent pacing throughout.",
        );
    }

    let clarity = acoustic.intelligibility_score;
    if clarity >= CLEAR_SPEECH {
        c.say(
            FeedbackCategory::Intelligibility,
            Severity::Success,
            format!("Boa clareza estimada ({clarity:.0}/100)."),
            format!("Good estimated clarity ({clarity:.0}/100)."),
        );
    } else if clarity < UNCLEAR_SPEECH {
        c.say(
            FeedbackCategory::Intelligibility,
            Severity::Warning,
            format!("Clareza estimada baixa ({clarity:.0}/100)."),
            format!("Low estimated clarity ({clarity:.0}/100)."),
        );
        c.recommend(
            "Articule bem as palavras e ajuste a velocidade para ser melhor compreendido.",
            "Articulate clearly and adjust your pace to be better understood.",
        );
    } else {
        c.say(
            FeedbackCategory::Intelligibility,
            Severity::Info,
            format!("Clareza estimada razoável ({clarity:.0}/100)."),
            format!("Fair estimated clarity ({clarity:.0}/100)."),
        );
    }
}

fn vocabulary_feedback(c: &mut Collector, transcript: &TranscriptAnalysis) {
    let vocabulary = &transcript.vocabulary;
    if vocabulary.total_words == 0 {
        return;
    }

    if vocabulary.type_token_ratio < REPETITIVE_TTR {
        c.say(
            FeedbackCategory::Vocabulary,
            Severity::Info,
            "Vocabulário repetitivo detectado.",
            "Repetitive vocabulary detected.",
        );
        c.recommend(
            "Tente usar sinônimos para enriquecer o texto.",
            "Try using synonyms to enrich your speech.",
        );
    } else if vocabulary.type_token_ratio > VARIED_TTR {
        c.say(
            FeedbackCategory::Vocabulary,
            Severity::Success,
            "Excelente variedade de vocabulário!",
            "Excellent vocabulary diversity!",
        );
    } else {
        c.say(
            FeedbackCategory::Vocabulary,
            Severity::Success,
            "Bom vocabulário. Continue diversificando suas palavras.",
            "Good vocabulary. Keep diversifying your words.",
        );
    }

    if vocabulary.filler_words_ratio > HIGH_FILLER_RATIO {
        let n = vocabulary.filler_words_count;
        c.say(
            FeedbackCategory::Vocabulary,
            Severity::Warning,
            format!("Alto uso de palavras de preenchimento ({n} detectadas)."),
            format!("Heavy use of filler words ({n} detected)."),
        );
        c.recommend(
            "Reduza o uso de 'tipo', 'então', 'né', etc.",
            "Cut down on 'um', 'like', 'so', etc.",
        );
    } else if vocabulary.filler_words_count == 0 {
        c.say(
            FeedbackCategory::Vocabulary,
            Severity::Success,
            "Nenhuma palavra de preenchimento detectada.",
            "No filler words detected.",
        );
    }

    if vocabulary.complex_words_ratio > COMPLEX_WORDS_RATIO {
        c.say(
            FeedbackCategory::Vocabulary,
            Severity::Success,
            "Bom uso de vocabulário complexo/técnico.",
            "Good use of complex/technical vocabulary.",
        );
    }
}

fn fluency_feedback(c: &mut Collector, transcript: &TranscriptAnalysis) {
    let fluency = &transcript.fluency;
    if fluency.fluency_score >= FLUENCY_EXCELLENT {
        c.say(
            FeedbackCategory::Fluency,
            Severity::Success,
            "Excelente fluência!",
            "Excellent fluency!",
        );
    } else if fluency.fluency_score >= FLUENCY_GOOD {
        c.say(
            FeedbackCategory::Fluency,
            Severity::Info,
            "Boa fluência geral.",
            "Good overall fluency.",
        );
    } else {
        c.say(
            FeedbackCategory::Fluency,
            Severity::Warning,
            "Há espaço para melhorar a fluência.",
            "There is room to improve your fluency.",
        );
    }

    if fluency.repetition_count > MAX_REPETITIONS {
        let n = fluency.repetition_count;
        c.say(
            FeedbackCategory::Fluency,
            Severity::Warning,
            format!("{n} repetições de palavras detectadas."),
            format!("{n} word repetitions detected."),
        );
        c.recommend(
            "Evite repetir palavras consecutivamente.",
            "Avoid repeating words back to back.",
        );
    }

    if fluency.self_corrections_count > MAX_SELF_CORRECTIONS {
        let n = fluency.self_corrections_count;
        c.say(
            FeedbackCategory::Fluency,
            Severity::Warning,
            format!("{n} autocorreções detectadas."),
            format!("{n} self-corrections detected."),
        );
        c.recommend(
            "Pratique mais para reduzir autocorreções.",
            "Practice more to reduce self-corrections.",
        );
    }
}

fn comparison_feedback(c: &mut Collector, comparison: &TextComparisonResult) {
    for (i, line) in comparison.feedback.iter().enumerate() {
        let severity = match i {
            0 if comparison.pronunciation_score >= GOOD_PRONUNCIATION => Severity::Success,
            0 => Severity::Warning,
            _ => Severity::Info,
        };
        c.out.items.push(FeedbackItem::new(
            FeedbackCategory::Pronunciation,
            severity,
            line.clone(),
        ));
    }
    if !comparison.mispronounced_words.is_empty() || !comparison.missing_words.is_empty() {
        c.recommend(
            "Releia o texto em voz alta devagar, focando nas palavras destacadas.",
            "Read the text aloud slowly, focusing on the highlighted words.",
        );
    }
}
