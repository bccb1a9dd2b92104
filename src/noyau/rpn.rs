// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> arbre
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis reconstruire le Node
//
// Règles:
// - Fonction (sin, cos, tan, exp, log) : empilée, sortie après sa parenthèse fermante.
// - Moins unaire:
//    - '-' en tête, ou juste après un opérateur / '(' => marqueur Neg (pas de 0 injecté)
//    - Neg a la précédence 3 et s’associe à droite : "-2**2" => -(2**2)
// - Profondeur de l’arbre bornée (PROFONDEUR_MAX) : les opérations récursives
//   (evaluate, differentiate, affichage) ne peuvent pas faire déborder la pile.
//   Les opérateurs associatifs à gauche donnent un arbre en peigne : "a + b + c + ..."
//   à n termes a une profondeur n, comme n parenthèses imbriquées.

use tracing::debug;

use super::erreur::{CalcError, ParseError};
use super::expr::{Node, Op, PREC_NEGATION};
use super::jetons::{format_tokens, tokenize, Tok};

/// Profondeur maximale acceptée pour un arbre issu du parseur
/// (une somme "à plat" de plus de PROFONDEUR_MAX termes est refusée).
pub const PROFONDEUR_MAX: usize = 1000;

/// Précédence d’un jeton de la pile (0 = pas un opérateur).
fn precedence(t: &Tok) -> u8 {
    match t {
        Tok::Op(op) => op.precedence(),
        Tok::Neg => PREC_NEGATION,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    match t {
        Tok::Op(op) => op.is_right_associative(),
        Tok::Neg => true,
        _ => false,
    }
}

/// Un '-' est unaire en tête, ou après un opérateur / '(' / un autre moins.
fn moins_est_unaire(prev: Option<&Tok>) -> bool {
    matches!(
        prev,
        None | Some(Tok::Op(_)) | Some(Tok::Moins) | Some(Tok::Neg) | Some(Tok::LPar)
    )
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Fonction(Sin), LPar, Ident("x"), Op(Div), Num(2), RPar]
///   rpn:    [Ident("x"), Num(2), Op(Div), Fonction(Sin)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, CalcError> {
    let mut out: Vec<Tok> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Tok> = Vec::new();

    for (i, tok) in tokens.iter().enumerate() {
        let prev = if i == 0 { None } else { tokens.get(i - 1) };

        match tok {
            Tok::Num(_) | Tok::Ident(_) => out.push(tok.clone()),

            Tok::Fonction(f) => {
                // fonction : argument obligatoirement entre parenthèses
                if tokens.get(i + 1) != Some(&Tok::LPar) {
                    return Err(ParseError::FonctionSansParenthese(*f).into());
                }
                ops.push(tok.clone());
            }

            Tok::LPar => ops.push(Tok::LPar),

            Tok::RPar => {
                // dépile jusqu’à '('
                loop {
                    match ops.pop() {
                        Some(Tok::LPar) => break,
                        Some(top) => out.push(top),
                        None => return Err(ParseError::ParentheseNonOuverte.into()),
                    }
                }

                // si une fonction est au sommet, elle prend le groupe comme argument
                if let Some(Tok::Fonction(_)) = ops.last() {
                    if let Some(f) = ops.pop() {
                        out.push(f);
                    }
                }
            }

            Tok::Virgule => return Err(ParseError::VirguleNonSupportee.into()),

            Tok::Neg => ops.push(Tok::Neg),

            Tok::Moins if moins_est_unaire(prev) => {
                // préfixe : rien à dépiler, il attend encore son opérande
                ops.push(Tok::Neg);
            }

            Tok::Moins | Tok::Op(_) => {
                let courant = match tok {
                    Tok::Moins => Tok::Op(Op::Sub),
                    _ => tok.clone(),
                };
                depile_operateurs(&courant, &mut ops, &mut out);
                ops.push(courant);
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar) {
            return Err(ParseError::ParentheseNonFermee.into());
        }
        out.push(op);
    }

    Ok(out)
}

/// Dépile tant que la précédence/associativité exige de sortir l’opérateur du haut.
/// On s’arrête sur '(' (et donc avant toute fonction, toujours sous sa parenthèse).
fn depile_operateurs(courant: &Tok, ops: &mut Vec<Tok>, out: &mut Vec<Tok>) {
    let p_tok = precedence(courant);
    let droite = is_right_associative(courant);

    while let Some(top) = ops.last() {
        if !matches!(top, Tok::Op(_) | Tok::Neg) {
            break;
        }

        let p_top = precedence(top);
        let doit_pop = if droite { p_tok < p_top } else { p_tok <= p_top };

        if !doit_pop {
            break;
        }
        if let Some(t) = ops.pop() {
            out.push(t);
        }
    }
}

/// Construit un Node à partir d’une RPN.
///
/// Opérateur binaire : le premier dépilé est le membre DROIT (ordre crucial pour - / **).
pub fn from_rpn(rpn: &[Tok]) -> Result<Node, CalcError> {
    // (noeud, profondeur)
    let mut st: Vec<(Node, usize)> = Vec::new();

    fn manquant(t: &Tok) -> CalcError {
        ParseError::OperandeManquant {
            symbole: format_tokens(std::slice::from_ref(t)),
        }
        .into()
    }

    for tok in rpn {
        let (e, prof) = match tok {
            Tok::Num(v) => (Node::Constant(*v), 1),
            Tok::Ident(name) => (Node::Variable(name.clone()), 1),

            Tok::Op(_) | Tok::Moins => {
                let op = match tok {
                    Tok::Op(op) => *op,
                    _ => Op::Sub,
                };
                let (b, pb) = st.pop().ok_or_else(|| manquant(tok))?;
                let (a, pa) = st.pop().ok_or_else(|| manquant(tok))?;
                (Node::binary(op, a, b), pa.max(pb) + 1)
            }

            Tok::Neg => {
                let (x, p) = st.pop().ok_or_else(|| manquant(tok))?;
                (Node::neg(x), p + 1)
            }

            Tok::Fonction(f) => {
                let (x, p) = st.pop().ok_or_else(|| manquant(tok))?;
                (Node::call(*f, x), p + 1)
            }

            Tok::LPar => return Err(ParseError::ParentheseNonFermee.into()),
            Tok::RPar => return Err(ParseError::ParentheseNonOuverte.into()),
            Tok::Virgule => return Err(ParseError::VirguleNonSupportee.into()),
        };

        if prof > PROFONDEUR_MAX {
            return Err(ParseError::ProfondeurExcessive { profondeur: prof }.into());
        }
        st.push((e, prof));
    }

    if st.len() > 1 {
        return Err(ParseError::ResultatInvalide {
            restants: st.len(),
        }
        .into());
    }
    st.pop()
        .map(|(e, _)| e)
        .ok_or_else(|| ParseError::ExpressionVide.into())
}

/// Texte -> arbre (jetons, shunting-yard, réduction).
pub fn parse(s: &str) -> Result<Node, CalcError> {
    let jetons = tokenize(s)?;
    let rpn = to_rpn(&jetons)?;
    debug!(entree = s, rpn = %format_tokens(&rpn), "parse");
    from_rpn(&rpn)
}
