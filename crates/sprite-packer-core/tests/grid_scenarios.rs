use sprite_packer_core::packer::OccupationGrid;

fn occupied_area(grid: &OccupationGrid) -> u64 {
    let mut area = 0u64;
    for (row, cells) in grid.cells().iter().enumerate() {
        for (col, &occupied) in cells.iter().enumerate() {
            if occupied {
                area += grid.widths()[col] as u64 * grid.heights()[row] as u64;
            }
        }
    }
    area
}

fn assert_sums(grid: &OccupationGrid) {
    assert_eq!(grid.widths().iter().sum::<u32>(), grid.total_width());
    assert_eq!(grid.heights().iter().sum::<u32>(), grid.total_height());
    assert_eq!(grid.cells().len(), grid.heights().len());
    for row in grid.cells() {
        assert_eq!(row.len(), grid.widths().len());
    }
}

#[test]
fn new_grid_is_one_free_cell() {
    let grid = OccupationGrid::new(10, 10);
    assert_eq!(grid.widths(), &[10]);
    assert_eq!(grid.heights(), &[10]);
    assert_eq!(grid.cells(), &[vec![false]]);
}

#[test]
fn sequential_fits_split_the_grid() {
    let mut grid = OccupationGrid::new(10, 10);

    assert_eq!(grid.try_fit(5, 11), None);
    assert_eq!(grid.widths(), &[10]);
    assert_eq!(grid.heights(), &[10]);
    assert_eq!(grid.cells(), &[vec![false]]);

    assert_eq!(grid.try_fit(3, 4), Some((0, 0)));
    assert_eq!(grid.widths(), &[3, 7]);
    assert_eq!(grid.heights(), &[4, 6]);
    assert_eq!(grid.cells(), &[vec![true, false], vec![false, false]]);

    assert_eq!(grid.try_fit(2, 1), Some((0, 4)));
    assert_eq!(grid.widths(), &[2, 1, 7]);
    assert_eq!(grid.heights(), &[4, 1, 5]);
    assert_eq!(
        grid.cells(),
        &[
            vec![true, true, false],
            vec![true, false, false],
            vec![false, false, false],
        ]
    );

    let before = grid.clone();
    assert_eq!(grid.try_fit(8, 7), None);
    assert_eq!(grid.widths(), before.widths());
    assert_eq!(grid.heights(), before.heights());
    assert_eq!(grid.cells(), before.cells());

    assert_eq!(grid.try_fit(1, 1), Some((0, 5)));
    assert_eq!(grid.try_fit(10, 4), Some((0, 6)));
    assert_sums(&grid);
    assert_eq!(occupied_area(&grid), 12 + 2 + 1 + 40);
}

#[test]
fn free_area_tracks_occupations() {
    let mut grid = OccupationGrid::new(10, 10);
    assert_eq!(grid.free_area(), 100);
    assert_eq!(grid.try_fit(3, 4), Some((0, 0)));
    assert_eq!(grid.free_area(), 88);
    assert_eq!(grid.try_fit(0, 9), Some((0, 0)));
    assert_eq!(grid.free_area(), 88);
    grid.add_occupation(1, 0, 7, 4);
    assert_eq!(grid.free_area(), 60);
    // 8x8 covers more than what is left.
    assert_eq!(grid.find(8, 8), None);
    assert_eq!(grid.try_fit(10, 6), Some((0, 4)));
    assert_eq!(grid.free_area(), 0);
    assert_eq!(grid.try_fit(1, 1), None);
}

#[test]
fn can_place_at_rejects_occupied_start_and_out_of_range_cells() {
    let mut grid = OccupationGrid::new(10, 10);
    grid.add_occupation(0, 0, 5, 5);
    assert!(!grid.can_place_at(0, 0, 1, 1));
    assert!(grid.can_place_at(1, 0, 1, 1));
    assert!(!grid.can_place_at(2, 0, 1, 1));
    assert!(!grid.can_place_at(0, 2, 1, 1));
}

#[test]
fn full_size_request_fits_fresh_grid() {
    let mut grid = OccupationGrid::new(10, 10);
    assert_eq!(grid.try_fit(10, 10), Some((0, 0)));
    assert_eq!(grid.widths(), &[10]);
    assert_eq!(grid.cells(), &[vec![true]]);
    assert_eq!(grid.try_fit(1, 1), None);
}

#[test]
fn no_room_left_for_overlapping_square() {
    let mut grid = OccupationGrid::new(10, 10);
    assert_eq!(grid.try_fit(5, 5), Some((0, 0)));
    assert_eq!(grid.try_fit(6, 6), None);
}

#[test]
fn zero_sized_requests_fit_without_mutation() {
    let mut grid = OccupationGrid::new(10, 10);
    assert_eq!(grid.try_fit(0, 4), Some((0, 0)));
    assert_eq!(grid.try_fit(4, 0), Some((0, 0)));
    assert_eq!(grid.try_fit(0, 0), Some((0, 0)));
    assert_eq!(grid.widths(), &[10]);
    assert_eq!(grid.heights(), &[10]);

    // Still succeeds once the canvas is full.
    assert_eq!(grid.try_fit(10, 10), Some((0, 0)));
    assert_eq!(grid.try_fit(0, 100), Some((0, 0)));
    assert_eq!(grid.cells(), &[vec![true]]);
}

#[test]
fn equal_tiles_fill_column_by_column() {
    for w in 1..10u32 {
        for h in 1..10u32 {
            let mut grid = OccupationGrid::new(10, 10);
            for i in 0..10 / w {
                for j in 0..10 / h {
                    assert_eq!(
                        grid.try_fit(w, h),
                        Some((i * w, j * h)),
                        "tile {w}x{h} #({i}, {j})"
                    );
                    assert_sums(&grid);
                }
            }
            assert_eq!(grid.try_fit(w, h), None, "tile {w}x{h} after filling");
            assert_eq!(occupied_area(&grid), ((10 / w) * w * (10 / h) * h) as u64);
        }
    }
}

#[test]
fn add_occupation_covers_whole_grid() {
    let mut grid = OccupationGrid::new(10, 10);
    grid.add_occupation(0, 0, 10, 10);
    assert_eq!(grid.cells(), &[vec![true]]);

    let mut grid = OccupationGrid::new(10, 10);
    grid.add_occupation(0, 0, 9, 9);
    grid.add_occupation(1, 0, 1, 9);
    grid.add_occupation(0, 1, 9, 1);
    grid.add_occupation(1, 1, 1, 1);
    assert_eq!(grid.widths(), &[9, 1]);
    assert_eq!(grid.heights(), &[9, 1]);
    assert!(grid.cells().iter().flatten().all(|&c| c));
}

#[test]
fn add_occupation_splits_only_where_needed() {
    let mut grid = OccupationGrid::new(10, 10);
    grid.add_occupation(0, 0, 3, 3);
    grid.add_occupation(0, 1, 3, 3);
    grid.add_occupation(0, 2, 3, 3);
    assert_eq!(grid.widths(), &[3, 7]);
    assert_eq!(grid.heights(), &[3, 3, 3, 1]);

    grid.add_occupation(1, 0, 3, 2);
    grid.add_occupation(1, 1, 3, 2);
    assert_eq!(grid.widths(), &[3, 3, 4]);
    assert_eq!(grid.heights(), &[2, 1, 1, 2, 3, 1]);
    assert_sums(&grid);
    assert_eq!(occupied_area(&grid), 27 + 6 + 6);
}

#[test]
#[should_panic]
fn add_occupation_over_occupied_cell_panics() {
    let mut grid = OccupationGrid::new(10, 10);
    grid.add_occupation(0, 0, 4, 4);
    grid.add_occupation(0, 0, 2, 2);
}

#[test]
fn can_place_at_checks_bounds_and_occupancy() {
    let mut grid = OccupationGrid::new(10, 10);
    assert_eq!(grid.try_fit(4, 4), Some((0, 0)));
    assert!(!grid.can_place_at(0, 0, 1, 1));
    assert!(grid.can_place_at(1, 0, 6, 10));
    assert!(!grid.can_place_at(1, 0, 7, 1));
    assert!(grid.can_place_at(0, 1, 10, 6));
    assert!(!grid.can_place_at(0, 1, 10, 7));
}

#[test]
fn find_does_not_mutate() {
    let mut grid = OccupationGrid::new(10, 10);
    grid.try_fit(3, 3);
    let slot = grid.find(2, 2).expect("room left");
    assert_eq!((slot.col, slot.row, slot.x, slot.y), (0, 1, 0, 3));
    assert_eq!(grid.widths(), &[3, 7]);
    assert_eq!(grid.try_fit(2, 2), Some((0, 3)));
}

#[test]
fn display_marks_occupied_cells() {
    let mut grid = OccupationGrid::new(10, 10);
    grid.try_fit(3, 4);
    let text = grid.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "         3    7");
    assert_eq!(lines[1], "    4 ####     ");
    assert_eq!(lines[2], "    6          ");
}
