//! Shared knowledge-base fixtures for unit tests.

use crate::corpus::loader::parse_corpus;
use crate::corpus::types::{Corpus, Language};
use serde_json::json;

pub fn english_corpus_json() -> String {
    json!({
        "metadata": { "version": "test", "totalQuestions": 9, "totalCantos": 12 },
        "cantos": [
            { "id": 1, "name": "Creation", "themes": ["creation"] },
            { "id": 2, "name": "The Cosmic Manifestation", "themes": ["self"] }
        ],
        "questions": [
            {
                "id": "q-self", "cantoId": 2,
                "question": "Who am I beyond this body?",
                "answer": "You are an eternal spiritual soul, distinct from the temporary material body (SB 2.2.6).",
                "verseRefs": ["SB 2.2.6"],
                "themes": ["self", "soul"],
                "keywords": ["self", "soul", "identity"],
                "difficulty": "foundational", "popularity": 95
            },
            {
                "id": "q-bhakti", "cantoId": 1,
                "question": "What is bhakti?",
                "answer": "Bhakti is loving devotional service to Krishna, performed without selfish motive (SB 1.2.6).",
                "verseRefs": ["SB 1.2.6"],
                "themes": ["devotion"],
                "keywords": ["bhakti", "devotion", "service"],
                "difficulty": "foundational", "popularity": 90
            },
            {
                "id": "q-karma", "cantoId": 5,
                "question": "How does karma bind the living being?",
                "answer": "Every action performed for selfish enjoyment creates reactions that bind the soul to repeated birth.",
                "verseRefs": [],
                "themes": ["karma"],
                "keywords": ["karma", "action", "rebirth"],
                "difficulty": "intermediate", "popularity": 80
            },
            {
                "id": "q-diet", "cantoId": 11,
                "question": "Which foods are offered in temple ritual?",
                "answer": "Grains, fruits and milk products are offered to the deity before being honored as prasadam.",
                "verseRefs": ["SB 11.27.34"],
                "themes": ["ritual", "diet"],
                "keywords": ["food", "ritual", "offering"],
                "difficulty": "advanced", "popularity": 40
            },
            {
                "id": "q-peace", "cantoId": 4,
                "question": "How can I find inner peace?",
                "answer": "Peace comes from fixing the mind on the Supreme and giving up the desire to control and enjoy.",
                "verseRefs": [],
                "themes": ["peace", "mind"],
                "keywords": ["peace", "mind", "tranquility"],
                "difficulty": "foundational", "popularity": 85
            },
            {
                "id": "q-mind", "cantoId": 11,
                "question": "How do I control my restless mind?",
                "answer": "Regular chanting and hearing about the Lord steadies the restless mind.",
                "verseRefs": [],
                "themes": ["mind", "practice"],
                "keywords": ["mind", "control", "meditation"],
                "difficulty": "intermediate", "popularity": 70
            },
            {
                "id": "q-death", "cantoId": 3,
                "question": "What happens at the time of death?",
                "answer": "At death the soul carries its subtle body to a new destination shaped by consciousness (SB 3.31.1).",
                "verseRefs": ["SB 3.31.1"],
                "themes": ["death", "soul"],
                "keywords": ["death", "rebirth"],
                "difficulty": "foundational", "popularity": 75
            },
            {
                "id": "q-maya", "cantoId": 1,
                "question": "What is maya?",
                "answer": "Maya is the illusory energy that makes the soul forget its relationship with God.",
                "verseRefs": [],
                "themes": ["illusion"],
                "keywords": ["maya", "illusion"],
                "difficulty": "foundational", "popularity": 60
            },
            {
                "id": "q-guru", "cantoId": 7,
                "question": "Why is a spiritual teacher necessary?",
                "answer": "A bona fide teacher carries the knowledge received in disciplic succession.",
                "verseRefs": [],
                "themes": ["guru"],
                "keywords": ["guru", "teacher"],
                "difficulty": "foundational", "popularity": 50
            }
        ],
        "verses": {
            "SB 2.2.6": {
                "text": "sarvatma-bhavena",
                "translation": "The soul is eternal and never perishes with the body.",
                "themes": ["soul"]
            },
            "SB 1.2.6": {
                "text": "sa vai pumsam paro dharmo",
                "translation": "The supreme occupation for all humanity is loving devotional service.",
                "themes": ["devotion"]
            },
            "SB 3.31.1": {
                "text": "karmana daiva-netrena",
                "translation": "Under the supervision of the Supreme, the soul enters a new body.",
                "themes": ["death"]
            }
        },
        "synonyms": {
            "soul": ["atma", "self", "spirit"],
            "devotion": ["bhakti", "love"],
            "peace": ["tranquility", "calm"]
        },
        "searchIndex": {
            "soul": { "questionIds": ["q-self", "q-death"], "frequency": 2, "importance": 0.9 },
            "bhakti": { "questionIds": ["q-bhakti"], "frequency": 1, "importance": 1.0 },
            "karma": { "questionIds": ["q-karma"], "frequency": 1, "importance": 0.8 }
        }
    })
    .to_string()
}

pub fn hindi_corpus_json() -> String {
    json!({
        "questions": [
            {
                "id": "hi-self", "cantoId": 2,
                "question": "मैं कौन हूँ?",
                "answer": "आप शाश्वत आत्मा हैं, यह शरीर नहीं (SB 2.2.6)।",
                "verseRefs": ["SB 2.2.6"],
                "themes": ["आत्मा"],
                "keywords": ["आत्मा"],
                "difficulty": "मूलभूत", "popularity": 90
            },
            {
                "id": "hi-bhakti", "cantoId": 1,
                "question": "भक्ति क्या है?",
                "answer": "भक्ति भगवान की प्रेममयी सेवा है।",
                "verseRefs": [],
                "themes": ["भक्ति"],
                "keywords": ["भक्ति"],
                "difficulty": "मध्यम", "popularity": 80
            }
        ],
        "verses": {},
        "synonyms": {},
        "searchIndex": {}
    })
    .to_string()
}

pub fn english_corpus() -> Corpus {
    parse_corpus(&english_corpus_json(), Language::En).expect("english fixture parses")
}

pub fn hindi_corpus() -> Corpus {
    parse_corpus(&hindi_corpus_json(), Language::Hi).expect("hindi fixture parses")
}

/// Writes the given corpora into a fresh temporary directory.
pub fn corpus_dir(files: &[(Language, String)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (language, body) in files {
        std::fs::write(dir.path().join(language.corpus_file()), body).expect("write corpus file");
    }
    dir
}
