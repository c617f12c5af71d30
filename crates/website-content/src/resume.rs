//! Resume content.

use crate::lang::{Lang, Localized};
use chrono::NaiveDate;

/// A work experience. Ongoing experiences have no end date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Experience {
    pub title: Localized,
    pub company: &'static str,
    pub location: &'static str,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub description: Localized,
    pub skills_and_tools: &'static [&'static str],
}

impl Experience {
    /// Number of (30 day) months worked, `None` while ongoing.
    #[must_use]
    pub fn months(&self) -> Option<i64> {
        self.to.map(|to| (to - self.from).num_days() / 30)
    }

    /// Human readable period, e.g. `01/2022 - 10/2022 (9 months)`.
    #[must_use]
    pub fn period(&self, lang: Lang, labels: &ResumeLabels) -> String {
        let from = self.from.format("%m/%Y");
        match (self.to, self.months()) {
            (Some(to), Some(months)) => format!(
                "{from} - {} ({months} {})",
                to.format("%m/%Y"),
                labels.months.get(lang)
            ),
            _ => format!("{from} - {}", labels.now.get(lang)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skill {
    pub title: Localized,
    pub tools: &'static [&'static str],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpokenLanguage {
    pub name: Localized,
    pub level: Localized,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub label: Localized,
    pub url: &'static str,
}

impl Link {
    /// Link text without the `mailto:` / `https://` scheme.
    #[must_use]
    pub fn display_text(&self) -> &'static str {
        self.url
            .strip_prefix("mailto:")
            .or_else(|| self.url.strip_prefix("https://"))
            .unwrap_or(self.url)
    }
}

/// Section titles and field labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResumeLabels {
    pub experiences: Localized,
    pub duration: Localized,
    pub company: Localized,
    pub location: Localized,
    pub technologies: Localized,
    pub description: Localized,
    pub now: Localized,
    pub months: Localized,
    pub skills: Localized,
    pub languages: Localized,
    pub external_links: Localized,
    pub contact: Localized,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resume {
    pub tagline: Localized,
    pub labels: ResumeLabels,
    pub experiences: Vec<Experience>,
    pub skills: Vec<Skill>,
    pub languages: Vec<SpokenLanguage>,
    pub external_links: Vec<Link>,
    pub contact_links: Vec<Link>,
}

fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}

impl Resume {
    /// The resume published on the site.
    #[must_use]
    pub fn published() -> Self {
        Self {
            tagline: Localized::new(
                "Passionate self-taught software engineer, specialised in backend and frontend web development.",
                "Développeur autodidacte passionné, spécialisé en développement web (backend et frontend).",
            ),
            labels: ResumeLabels {
                experiences: Localized::new("Work experience", "Expériences"),
                duration: Localized::new("Duration", "Durée"),
                company: Localized::same("Organisation"),
                location: Localized::new("Location", "Lieu"),
                technologies: Localized::same("Technologies"),
                description: Localized::same("Description"),
                now: Localized::new("now", "maintenant"),
                months: Localized::new("months", "mois"),
                skills: Localized::new("Skills", "Compétences"),
                languages: Localized::new("Languages", "Langues"),
                external_links: Localized::new("External links", "Liens externes"),
                contact: Localized::same("Contact"),
            },
            experiences: vec![
                Experience {
                    title: Localized::new("Web development tutor", "Formateur en développement web"),
                    company: "Orange, Prison de Melun, Mission Locale, Code Phenix, L'Ilot",
                    location: "Paris, France",
                    from: month(2023, 1),
                    to: None,
                    description: Localized::new(
                        "Taught web development fundamentals with social programs for (ex-) prisoners and youth at risk.",
                        "Formation de (ex-) détenus et de jeunes en difficulté aux fondamentaux du développement web.",
                    ),
                    skills_and_tools: &["HTML", "CSS", "JavaScript", "HTTP"],
                },
                Experience {
                    title: Localized::new("Backend software engineer", "Développeur backend"),
                    company: "Canal+",
                    location: "Paris, France",
                    from: month(2022, 1),
                    to: Some(month(2022, 10)),
                    description: Localized::new(
                        "Contributed to a new live video streaming solution based on DASH and HLS.",
                        "Contribution à une nouvelle solution de live streaming vidéo basée sur DASH et HLS.",
                    ),
                    skills_and_tools: &["Golang", "Docker", "Kubernetes", "PostgreSQL", "Bash", "Gitlab CI", "AWS"],
                },
                Experience {
                    title: Localized::new("Freelance web developer", "Développeur web freelance"),
                    company: "Record Eye, Cyclic Studio",
                    location: "Paris, France",
                    from: month(2020, 9),
                    to: Some(month(2022, 1)),
                    description: Localized::new(
                        "Handled frontend and backend web development projects.",
                        "Gestion de projets de développement front et back pour plusieurs PME.",
                    ),
                    skills_and_tools: &["Golang", "TypeScript", "Svelte / Vue / React", "HTML", "CSS", "HTTP", "GCP"],
                },
                Experience {
                    title: Localized::new("Chief Operations Officer", "Directeur des opérations"),
                    company: "Green Online",
                    location: "Amsterdam, Netherlands",
                    from: month(2018, 9),
                    to: Some(month(2020, 4)),
                    description: Localized::new(
                        "Managed the expansion and operation of our web application in 5 new European countries.",
                        "Expansion et gestion de notre application web dans 5 nouveaux pays européens.",
                    ),
                    skills_and_tools: &["Ruby on Rails", "GCP"],
                },
            ],
            skills: vec![
                Skill {
                    title: Localized::new("Programming languages", "Langages de programmation"),
                    tools: &["Golang", "JavaScript / TypeScript"],
                },
                Skill {
                    title: Localized::new("Website development", "Développement de site web"),
                    tools: &["HTTP", "HTML", "CSS", "JS", "Svelte / Vue / React", "A11y"],
                },
                Skill {
                    title: Localized::same("DevOps & CI/CD"),
                    tools: &["Linux", "Bash", "Ansible", "Gitlab CI / Github Actions", "Docker / Podman", "Kubernetes"],
                },
                Skill {
                    title: Localized::new("Database", "Bases de données"),
                    tools: &["PostgreSQL", "MongoDB", "SQLite", "BoltDB"],
                },
            ],
            languages: vec![
                SpokenLanguage {
                    name: Localized::new("French", "Français"),
                    level: Localized::new("Native", "Langue maternelle"),
                },
                SpokenLanguage {
                    name: Localized::new("English", "Anglais"),
                    level: Localized::new("Bilingual", "Bilingue"),
                },
                SpokenLanguage {
                    name: Localized::new("Spanish", "Espagnol"),
                    level: Localized::new("Working proficiency", "Niveau professionnel"),
                },
                SpokenLanguage {
                    name: Localized::new("Dutch", "Néerlandais"),
                    level: Localized::new("Basic understanding", "Compréhension basique"),
                },
            ],
            external_links: vec![
                Link {
                    label: Localized::same("GitHub"),
                    url: "https://github.com/ejuju",
                },
                Link {
                    label: Localized::new("Algorithmic art", "Art algorithmique"),
                    url: "https://instagram.com/algo.croissant",
                },
            ],
            contact_links: vec![Link {
                label: Localized::new("Online contact form", "Formulaire de contact en ligne"),
                url: "/contact",
            }],
        }
    }
}
