// src/noyau/erreur.rs
//
// Erreurs typées du noyau.
// Chaque étape (jetons, RPN, arbre, évaluation, numérique) échoue avec une variante
// distincte, pour que l’appelant puisse afficher précisément ce qui cloche.

use std::fmt;

use super::expr::Fonction;

/// Échecs du parseur (shunting-yard + réduction RPN).
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    /// Aucun opérande produit (entrée vide, "()" seul, etc.).
    ExpressionVide,
    /// Un '(' n’a jamais été refermé.
    ParentheseNonFermee,
    /// Un ')' sans '(' correspondant.
    ParentheseNonOuverte,
    /// Opérateur (ou fonction) sans assez d’opérandes.
    OperandeManquant { symbole: String },
    /// Plusieurs valeurs restent sur la pile après réduction (ex: "2 3").
    ResultatInvalide { restants: usize },
    /// sin/cos/tan/exp/log doit être suivi de '('.
    FonctionSansParenthese(Fonction),
    /// Les appels multi-arguments ne sont pas supportés.
    VirguleNonSupportee,
    /// Arbre plus profond que la limite du parseur. Une longue chaîne
    /// d’opérateurs ("1 + 1 + ... + 1") compte comme une imbrication.
    ProfondeurExcessive { profondeur: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ExpressionVide => write!(f, "expression vide"),
            ParseError::ParentheseNonFermee => write!(f, "parenthèses non fermées"),
            ParseError::ParentheseNonOuverte => write!(f, "parenthèse fermante sans ouvrante"),
            ParseError::OperandeManquant { symbole } => {
                write!(f, "opérande manquant pour '{symbole}'")
            }
            ParseError::ResultatInvalide { restants } => {
                write!(f, "expression invalide ({restants} valeurs sans opérateur)")
            }
            ParseError::FonctionSansParenthese(fonction) => {
                write!(f, "la fonction {fonction} doit être suivie de '('")
            }
            ParseError::VirguleNonSupportee => {
                write!(f, "virgule inattendue (fonctions à un seul argument)")
            }
            ParseError::ProfondeurExcessive { profondeur } => {
                write!(
                    f,
                    "expression trop profonde (profondeur {profondeur}, parenthèses et chaînes d’opérateurs comprises)"
                )
            }
        }
    }
}

/// Erreur publique du noyau.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcError {
    /// Morceau de texte qui ne peut former aucun jeton.
    Tokenize { morceau: String },
    Parse(ParseError),
    /// Fonction appliquée hors de son domaine pendant le pliage de constantes.
    Domain { fonction: String, valeur: f64 },
    DivisionByZero,
    /// Le moteur numérique a reçu un résultat encore symbolique.
    NonNumerique { expression: String },
    /// Intervalle d’intégration / de recherche inutilisable.
    Intervalle {
        variable: String,
        debut: f64,
        fin: f64,
    },
    /// Intégration demandée sans aucune variable.
    SansDomaine,
    /// Réglage numérique inutilisable (pas nul, tolérance négative, etc.).
    ParametreInvalide { nom: &'static str, valeur: f64 },
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::Tokenize { morceau } => write!(f, "caractère inattendu dans '{morceau}'"),
            CalcError::Parse(e) => write!(f, "{e}"),
            CalcError::Domain { fonction, valeur } => {
                write!(f, "{fonction} non défini en {valeur}")
            }
            CalcError::DivisionByZero => write!(f, "division par zéro"),
            CalcError::NonNumerique { expression } => {
                write!(f, "résultat non numérique: {expression}")
            }
            CalcError::Intervalle {
                variable,
                debut,
                fin,
            } => write!(f, "intervalle invalide pour {variable}: [{debut}, {fin}]"),
            CalcError::SansDomaine => write!(f, "aucune variable d’intégration"),
            CalcError::ParametreInvalide { nom, valeur } => {
                write!(f, "paramètre numérique invalide: {nom} = {valeur}")
            }
        }
    }
}

impl std::error::Error for CalcError {}

impl From<ParseError> for CalcError {
    fn from(e: ParseError) -> Self {
        CalcError::Parse(e)
    }
}
