use super::types::{Direction, Position};

/// Builds a body of `length` cells trailing back from the head, opposite to
/// `direction`. Coordinates are not wrapped.
pub fn create_snake(
    start_x: i32,
    start_y: i32,
    direction: Direction,
    length: usize,
) -> Vec<Position> {
    let (dx, dy) = direction.delta();
    (0..length as i32)
        .map(|index| Position::new(start_x - dx * index, start_y - dy * index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::INITIAL_SNAKE_LENGTH;

    #[test]
    fn right_heading_trails_to_the_left() {
        let snake = create_snake(5, 5, Direction::Right, INITIAL_SNAKE_LENGTH);
        assert_eq!(
            snake,
            vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]
        );
    }

    #[test]
    fn left_heading_trails_to_the_right() {
        let snake = create_snake(15, 15, Direction::Left, INITIAL_SNAKE_LENGTH);
        assert_eq!(
            snake,
            vec![Position::new(15, 15), Position::new(16, 15), Position::new(17, 15)]
        );
    }

    #[test]
    fn vertical_headings_trail_opposite() {
        let up = create_snake(2, 2, Direction::Up, 3);
        assert_eq!(up, vec![Position::new(2, 2), Position::new(2, 3), Position::new(2, 4)]);
        let down = create_snake(2, 2, Direction::Down, 3);
        assert_eq!(down, vec![Position::new(2, 2), Position::new(2, 1), Position::new(2, 0)]);
    }

    #[test]
    fn edge_start_is_not_clamped() {
        let snake = create_snake(0, 0, Direction::Right, 3);
        assert_eq!(snake[2], Position::new(-2, 0));
    }

    #[test]
    fn zero_length_is_empty() {
        assert!(create_snake(5, 5, Direction::Up, 0).is_empty());
    }
}
