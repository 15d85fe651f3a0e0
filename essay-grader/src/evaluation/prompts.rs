//! Prompt templates (Portuguese)
//!
//! Every rubric prompt asks the model to open with the literal score token
//! followed by a number between 0 and 1, then justify the rating.

use super::{EvaluationState, Rubric, DISPLAY_SCALE};

/// Literal token the rubric prompts ask the model to emit
pub const SCORE_TOKEN: &str = "Pontuação: ";

fn rubric_instruction(rubric: Rubric) -> &'static str {
    match rubric {
        Rubric::Relevance => {
            "Analise a relevância da seguinte redação em relação ao tema proposto, \
             zelando pela excelência da Língua Portuguesa."
        }
        Rubric::Grammar => "Analise a gramática da Língua Portuguesa na seguinte redação.",
        Rubric::Structure => {
            "Analise a estrutura da seguinte redação: introdução, desenvolvimento, \
             conclusão e a coesão entre os parágrafos."
        }
        Rubric::Depth => {
            "Analise a profundidade da seguinte redação: a qualidade da argumentação, \
             o repertório utilizado e o senso crítico em relação ao tema."
        }
    }
}

/// Rubrics whose scores are shown to the model as context
fn prior_rubrics(rubric: Rubric) -> &'static [Rubric] {
    match rubric {
        Rubric::Relevance | Rubric::Grammar => &[],
        Rubric::Structure => &[Rubric::Relevance, Rubric::Grammar],
        Rubric::Depth => &[Rubric::Relevance, Rubric::Grammar, Rubric::Structure],
    }
}

/// Prompt for one rubric evaluation
pub fn rubric_prompt(rubric: Rubric, state: &EvaluationState) -> String {
    let mut prompt = String::new();
    prompt.push_str(rubric_instruction(rubric));
    prompt.push(' ');
    prompt.push_str(&format!(
        "Forneça uma pontuação de {} entre 0 e 1. \
         Sua resposta deve começar com '{}' seguida da pontuação numérica, \
         depois forneça sua explicação.",
        rubric.label_pt(),
        SCORE_TOKEN
    ));

    let priors = prior_rubrics(rubric);
    if !priors.is_empty() {
        let context: Vec<String> = priors
            .iter()
            .map(|r| format!("{}: {:.2}", r.label_pt(), state.score(*r)))
            .collect();
        prompt.push_str(&format!(
            "\n\nPontuações já atribuídas (0 a 1): {}.",
            context.join(", ")
        ));
    }

    prompt.push_str(&format!("\n\nRedação: {}", state.essay));
    prompt
}

/// Prompt for corrective feedback; scores shown on the 0-10 scale
pub fn corrections_prompt(state: &EvaluationState) -> String {
    format!(
        "Você é um professor de Língua Portuguesa com ampla experiência na correção de redações. \
         A redação abaixo recebeu as seguintes notas (escala de 0 a 10):\n\
         - Relevância: {:.1}\n\
         - Gramática: {:.1}\n\
         - Estrutura: {:.1}\n\
         - Profundidade: {:.1}\n\
         - Nota final: {:.1}\n\n\
         Critérios com nota 0 podem não ter sido avaliados porque a redação não atingiu \
         o mínimo em um critério anterior.\n\n\
         Aponte os principais erros da redação (gramaticais, estruturais e argumentativos), \
         cite os trechos em que aparecem e explique como corrigi-los. \
         Seja claro, objetivo e construtivo.\n\n\
         Redação: {}",
        state.relevance * DISPLAY_SCALE,
        state.grammar * DISPLAY_SCALE,
        state.structure * DISPLAY_SCALE,
        state.depth * DISPLAY_SCALE,
        state.final_score * DISPLAY_SCALE,
        state.essay
    )
}

/// Prompt for an exemplary essay on `theme`
pub fn exemplary_prompt(theme: &str) -> String {
    format!(
        "Você é um especialista em redação com mais de 20 anos de experiência na área \
         e sua tarefa é escrever uma redação exemplar sobre o tema fornecido.\n\n\
         Tema da redação: {}\n\n\
         Escreva uma redação de qualidade seguindo estas diretrizes:\n\
         - Inclua uma introdução clara que apresente o tema e estabeleça a tese.\n\
         - Desenvolva o tema com argumentos bem estruturados e coesos.\n\
         - Termine com uma conclusão que retome a tese e sintetize os argumentos principais.\n\
         - Use linguagem formal e clara.\n\
         - Garanta boa organização e coesão entre os parágrafos.\n\n\
         A redação deve ter cerca de 500 palavras.",
        theme
    )
}

/// Prompt for improvement suggestions on `essay`
pub fn improvements_prompt(essay: &str) -> String {
    format!(
        "Você é um professor de Língua Portuguesa especializado em redação. \
         Leia a redação abaixo e sugira melhorias concretas, em ordem de prioridade, \
         considerando relevância ao tema, gramática, estrutura e profundidade argumentativa. \
         Para cada sugestão, explique o problema e mostre como o trecho poderia ser reescrito.\n\n\
         Redação: {}",
        essay
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored_state() -> EvaluationState {
        EvaluationState {
            essay: "A educação transforma.".to_string(),
            relevance: 0.9,
            grammar: 0.8,
            structure: 0.75,
            depth: 0.0,
            final_score: 0.58,
            corrections: String::new(),
        }
    }

    #[test]
    fn test_every_rubric_prompt_requests_score_token_and_embeds_essay() {
        let state = scored_state();
        for rubric in Rubric::ALL {
            let prompt = rubric_prompt(rubric, &state);
            assert!(prompt.contains("'Pontuação: '"), "{} prompt", rubric);
            assert!(prompt.contains("entre 0 e 1"));
            assert!(prompt.ends_with("Redação: A educação transforma."));
            assert!(prompt.contains(rubric.label_pt()));
        }
    }

    #[test]
    fn test_early_rubrics_have_no_prior_scores() {
        let state = scored_state();
        assert!(!rubric_prompt(Rubric::Relevance, &state).contains("Pontuações já atribuídas"));
        assert!(!rubric_prompt(Rubric::Grammar, &state).contains("Pontuações já atribuídas"));
    }

    #[test]
    fn test_later_rubrics_embed_prior_scores() {
        let state = scored_state();
        let structure = rubric_prompt(Rubric::Structure, &state);
        assert!(structure.contains("relevância: 0.90"));
        assert!(structure.contains("gramática: 0.80"));

        let depth = rubric_prompt(Rubric::Depth, &state);
        assert!(depth.contains("estrutura: 0.75"));
    }

    #[test]
    fn test_corrections_prompt_scales_scores() {
        let prompt = corrections_prompt(&scored_state());
        assert!(prompt.contains("Relevância: 9.0"));
        assert!(prompt.contains("Gramática: 8.0"));
        assert!(prompt.contains("Estrutura: 7.5"));
        assert!(prompt.contains("Profundidade: 0.0"));
        assert!(prompt.contains("Nota final: 5.8"));
        assert!(prompt.ends_with("Redação: A educação transforma."));
    }

    #[test]
    fn test_exemplary_prompt_mentions_theme_and_length() {
        let prompt = exemplary_prompt("Mobilidade urbana");
        assert!(prompt.contains("Tema da redação: Mobilidade urbana"));
        assert!(prompt.contains("500 palavras"));
        assert!(prompt.contains("introdução"));
        assert!(prompt.contains("conclusão"));
    }

    #[test]
    fn test_improvements_prompt_embeds_essay() {
        assert!(improvements_prompt("Meu texto").ends_with("Redação: Meu texto"));
    }
}
