//! Pareto archive maintenance: accumulate every non-dominated candidate
//! seen during a run, with duplicates removed by chromosome equality.

use std::cmp::Ordering;

use crate::genetic::{
    Candidate, FitnessMatrix, Gene, Population, chromosomes_equal, fitness_matrix,
};
use crate::math;

/// Fold a population into the archive: insert everything, keep only the
/// non-dominated candidates, drop chromosome duplicates.
pub(crate) fn update_archive<G: Gene>(
    archive: &mut Population<G>,
    population: &[Candidate<G>],
    num_objectives: usize,
) {
    archive.extend(population.iter().cloned());

    let fmat = fitness_matrix(archive);
    let front = pareto_front_indices(&fmat, num_objectives);
    let mut pruned: Population<G> = front.into_iter().map(|idx| archive[idx].clone()).collect();

    pruned.sort_by(lexicographic_chromosome_cmp);
    pruned.dedup_by(|a, b| chromosomes_equal(&a.chromosome, &b.chromosome));
    *archive = pruned;
}

/// The indices of the non-dominated rows of a fitness matrix. Single
/// objective runs use a linear scan, multi-objective runs Kung's
/// divide-and-conquer algorithm.
pub fn pareto_front_indices(fitness_matrix: &FitnessMatrix, num_objectives: usize) -> Vec<usize> {
    if fitness_matrix.nrows() == 0 {
        return Vec::new();
    }
    if num_objectives == 1 {
        pareto_front_1d(fitness_matrix)
    } else {
        pareto_front_kung(fitness_matrix)
    }
}

fn pareto_front_1d(fitness_matrix: &FitnessMatrix) -> Vec<usize> {
    let column = fitness_matrix.column(0);
    let max = column.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));

    (0..column.len())
        .filter(|&idx| math::float_is_equal(column[idx], max))
        .collect()
}

fn pareto_front_kung(fitness_matrix: &FitnessMatrix) -> Vec<usize> {
    // Sort lexicographically descending: a dominating row always comes
    // before every row it dominates, which is the precondition of the
    // merge step.
    let mut order: Vec<usize> = (0..fitness_matrix.nrows()).collect();
    order.sort_by(|&a, &b| {
        for d in 0..fitness_matrix.ncols() {
            match fitness_matrix[[b, d]].partial_cmp(&fitness_matrix[[a, d]]) {
                Some(Ordering::Equal) | None => continue,
                Some(ordering) => return ordering,
            }
        }
        Ordering::Equal
    });

    kung_front(fitness_matrix, &order)
}

fn kung_front(fitness_matrix: &FitnessMatrix, order: &[usize]) -> Vec<usize> {
    if order.len() == 1 {
        return order.to_vec();
    }

    let mid = order.len() / 2;
    let top = kung_front(fitness_matrix, &order[..mid]);
    let bottom = kung_front(fitness_matrix, &order[mid..]);

    // Only the top half can dominate candidates of the bottom half.
    let mut merged = top;
    let top_len = merged.len();
    for &candidate in &bottom {
        let dominated = merged[..top_len].iter().any(|&winner| {
            math::pareto_dominates(fitness_matrix.row(winner), fitness_matrix.row(candidate))
        });
        if !dominated {
            merged.push(candidate);
        }
    }
    merged
}

fn lexicographic_chromosome_cmp<G: Gene>(a: &Candidate<G>, b: &Candidate<G>) -> Ordering {
    for (x, y) in a.chromosome.iter().zip(b.chromosome.iter()) {
        match x.partial_cmp(y) {
            Some(Ordering::Equal) | None => continue,
            Some(ordering) => return ordering,
        }
    }
    a.chromosome.len().cmp(&b.chromosome.len())
}
