use chrono::NaiveDate;

use crate::catalog::schema::{Catalog, Course, Institution, InstitutionType, RequirementSet, SubjectKey};

/// Reference catalog shipped with the binary, used when no catalog file is configured.
pub fn default_catalog() -> Catalog {
    Catalog::with_fingerprint(default_courses(), default_institutions())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn default_courses() -> Vec<Course> {
    vec![
        Course {
            id: 1,
            name: "Computer Science".to_string(),
            institution: "University of Cape Town".to_string(),
            category: "computer_science".to_string(),
            requirements: RequirementSet::new()
                .with(SubjectKey::Mathematics, 70)
                .with(SubjectKey::PhysicalScience, 65)
                .with(SubjectKey::English, 60),
            description: "Focus on software development, algorithms, and computer systems."
                .to_string(),
            duration: "3-4 years".to_string(),
            career_paths: vec![
                "Software Developer".to_string(),
                "Data Scientist".to_string(),
                "Systems Analyst".to_string(),
            ],
            admission_points: 40,
            application_deadline: date(2024, 9, 30),
        },
        Course {
            id: 2,
            name: "Electrical Engineering".to_string(),
            institution: "Wits University".to_string(),
            category: "electrical_engineering".to_string(),
            requirements: RequirementSet::new()
                .with(SubjectKey::Mathematics, 75)
                .with(SubjectKey::PhysicalScience, 70)
                .with(SubjectKey::English, 60),
            description: "Design and develop electrical systems and electronic devices."
                .to_string(),
            duration: "4 years".to_string(),
            career_paths: vec![
                "Electrical Engineer".to_string(),
                "Electronics Designer".to_string(),
                "Power Systems Engineer".to_string(),
            ],
            admission_points: 42,
            application_deadline: date(2024, 10, 15),
        },
        Course {
            id: 3,
            name: "Business Science".to_string(),
            institution: "University of Pretoria".to_string(),
            category: "business_science".to_string(),
            requirements: RequirementSet::new()
                .with(SubjectKey::Mathematics, 65)
                .with(SubjectKey::English, 65),
            description: "Combine business principles with analytical skills.".to_string(),
            duration: "3-4 years".to_string(),
            career_paths: vec![
                "Business Analyst".to_string(),
                "Marketing Manager".to_string(),
                "Financial Analyst".to_string(),
            ],
            admission_points: 38,
            application_deadline: date(2024, 9, 28),
        },
        Course {
            id: 4,
            name: "Information Technology".to_string(),
            institution: "Cape Peninsula University of Technology".to_string(),
            category: "information_technology".to_string(),
            requirements: RequirementSet::new()
                .with(SubjectKey::Mathematics, 55)
                .with(SubjectKey::English, 50),
            description: "Build and support networks, applications, and IT infrastructure."
                .to_string(),
            duration: "3 years".to_string(),
            career_paths: vec![
                "Network Administrator".to_string(),
                "Software Developer".to_string(),
                "IT Support Specialist".to_string(),
            ],
            admission_points: 30,
            application_deadline: date(2024, 9, 30),
        },
        Course {
            id: 5,
            name: "Data Science".to_string(),
            institution: "Stellenbosch University".to_string(),
            category: "data_science".to_string(),
            requirements: RequirementSet::new()
                .with(SubjectKey::Mathematics, 75)
                .with(SubjectKey::English, 60),
            description: "Apply statistics and computing to extract insight from data."
                .to_string(),
            duration: "3 years".to_string(),
            career_paths: vec![
                "Data Scientist".to_string(),
                "Machine Learning Engineer".to_string(),
                "Quantitative Analyst".to_string(),
            ],
            admission_points: 38,
            application_deadline: date(2024, 7, 31),
        },
    ]
}

fn default_institutions() -> Vec<Institution> {
    vec![
        Institution {
            id: "uct".to_string(),
            name: "University of Cape Town".to_string(),
            location: "Cape Town, Western Cape".to_string(),
            institution_type: InstitutionType::University,
            ranking: 1,
            application_fee: 200,
            closing_date: date(2024, 9, 30),
            courses: vec![
                "Computer Science".to_string(),
                "Electrical Engineering".to_string(),
                "Business Science".to_string(),
            ],
            requirements: RequirementSet::new().with(SubjectKey::English, 50),
        },
        Institution {
            id: "wits".to_string(),
            name: "University of the Witwatersrand".to_string(),
            location: "Johannesburg, Gauteng".to_string(),
            institution_type: InstitutionType::University,
            ranking: 2,
            application_fee: 200,
            closing_date: date(2024, 10, 15),
            courses: vec![
                "Electrical Engineering".to_string(),
                "Mechanical Engineering".to_string(),
            ],
            requirements: RequirementSet::new().with(SubjectKey::English, 50),
        },
        Institution {
            id: "up".to_string(),
            name: "University of Pretoria".to_string(),
            location: "Pretoria, Gauteng".to_string(),
            institution_type: InstitutionType::University,
            ranking: 3,
            application_fee: 300,
            closing_date: date(2024, 9, 28),
            courses: vec![
                "Business Science".to_string(),
                "Computer Science".to_string(),
            ],
            requirements: RequirementSet::new(),
        },
        Institution {
            id: "cput".to_string(),
            name: "Cape Peninsula University of Technology".to_string(),
            location: "Cape Town, Western Cape".to_string(),
            institution_type: InstitutionType::UniversityOfTechnology,
            ranking: 8,
            application_fee: 100,
            closing_date: date(2024, 9, 30),
            courses: vec!["Information Technology".to_string()],
            requirements: RequirementSet::new(),
        },
        Institution {
            id: "dut".to_string(),
            name: "Durban University of Technology".to_string(),
            location: "Durban, KwaZulu-Natal".to_string(),
            institution_type: InstitutionType::UniversityOfTechnology,
            ranking: 10,
            application_fee: 250,
            closing_date: date(2024, 9, 30),
            courses: vec!["Information Technology".to_string()],
            requirements: RequirementSet::new(),
        },
    ]
}
