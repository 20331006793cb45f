//! Question catalog: the fixed questionnaire, grouped by category.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct QuestionDef {
    pub id: &'static str,
    pub question: &'static str,
    /// Empty for free-text questions.
    pub options: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct CategoryDef {
    pub category: &'static str,
    pub questions: &'static [QuestionDef],
}

pub const UNKNOWN_QUESTION: &str = "Unknown Question";

pub static CATALOG: &[CategoryDef] = &[
    CategoryDef {
        category: "college_match",
        questions: &[
            QuestionDef {
                id: "cm1",
                question: "What size of college do you prefer?",
                options: &[
                    "Small (under 5,000)",
                    "Medium (5,000 - 15,000)",
                    "Large (over 15,000)",
                    "No preference",
                ],
            },
            QuestionDef {
                id: "cm2",
                question: "What type of setting would you like your college to be in?",
                options: &["Urban", "Suburban", "Rural", "No preference"],
            },
            QuestionDef {
                id: "cm3",
                question: "How far from home are you willing to go?",
                options: &[
                    "In my home state",
                    "Within a day's drive",
                    "Anywhere in the country",
                    "Anywhere in the world",
                ],
            },
            QuestionDef {
                id: "cm4",
                question: "Which regions of the country interest you?",
                options: &["Northeast", "Southeast", "Midwest", "Southwest", "West Coast"],
            },
            QuestionDef {
                id: "cm5",
                question: "What kind of campus culture are you looking for?",
                options: &[],
            },
        ],
    },
    CategoryDef {
        category: "academics",
        questions: &[
            QuestionDef {
                id: "a1",
                question: "What is your current unweighted GPA?",
                options: &["3.8 - 4.0", "3.5 - 3.79", "3.0 - 3.49", "Below 3.0"],
            },
            QuestionDef {
                id: "a2",
                question: "How many AP, IB, or honors courses have you taken?",
                options: &["None", "1 - 3", "4 - 7", "8 or more"],
            },
            QuestionDef {
                id: "a3",
                question: "What intended major or field of study are you considering?",
                options: &[],
            },
            QuestionDef {
                id: "a4",
                question: "Which academic subjects do you enjoy most?",
                options: &[],
            },
            QuestionDef {
                id: "a5",
                question: "Do you plan to submit standardized test scores?",
                options: &["Yes, SAT", "Yes, ACT", "Yes, both", "No, test-optional"],
            },
        ],
    },
    CategoryDef {
        category: "interests",
        questions: &[
            QuestionDef {
                id: "i1",
                question: "Which extracurricular activities are you most involved in?",
                options: &[],
            },
            QuestionDef {
                id: "i2",
                question: "Have you held any leadership positions?",
                options: &[],
            },
            QuestionDef {
                id: "i3",
                question: "What do you like to do in your free time?",
                options: &[],
            },
            QuestionDef {
                id: "i4",
                question: "Are you interested in playing a sport in college?",
                options: &["Yes, varsity", "Yes, club or intramural", "No"],
            },
            QuestionDef {
                id: "i5",
                question: "What impact do you hope to make after college?",
                options: &[],
            },
        ],
    },
    CategoryDef {
        category: "financial",
        questions: &[
            QuestionDef {
                id: "f1",
                question: "What is your family's budget for college per year?",
                options: &[
                    "Under $20,000",
                    "$20,000 - $40,000",
                    "$40,000 - $60,000",
                    "Over $60,000",
                ],
            },
            QuestionDef {
                id: "f2",
                question: "Will you be applying for financial aid?",
                options: &["Yes", "No", "Not sure"],
            },
            QuestionDef {
                id: "f3",
                question: "How important are merit scholarships in your decision?",
                options: &["Very important", "Somewhat important", "Not important"],
            },
            QuestionDef {
                id: "f4",
                question: "Are you open to in-state public universities to reduce cost?",
                options: &["Yes", "No", "Maybe"],
            },
        ],
    },
];

pub fn category(name: &str) -> Option<&'static CategoryDef> {
    CATALOG.iter().find(|c| c.category == name)
}

pub fn is_known_category(name: &str) -> bool {
    category(name).is_some()
}

pub fn question_text(category_name: &str, question_id: &str) -> Option<&'static str> {
    category(category_name)?
        .questions
        .iter()
        .find(|q| q.id == question_id)
        .map(|q| q.question)
}
