use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Lang {
    En,
    Ru,
}

static CURRENT_LANG: AtomicU8 = AtomicU8::new(0); // 0=En (default)

pub fn lang() -> Lang {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        1 => Lang::Ru,
        _ => Lang::En,
    }
}

pub fn set_lang(l: Lang) {
    CURRENT_LANG.store(
        match l {
            Lang::En => 0,
            Lang::Ru => 1,
        },
        Ordering::Relaxed,
    );
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    let ru = lang() == Lang::Ru;
    match key {
        // ── Tooltip titles ──────────────────────────────────
        "measure.distance" => if ru { "Расстояние" } else { "Distance" },
        "measure.area" => if ru { "Площадь" } else { "Area" },
        "measure.location" => if ru { "Координаты" } else { "Location" },
        "measure.radius" => if ru { "Радиус" } else { "Radius" },
        "measure.angle" => if ru { "Угол" } else { "Angle" },

        // ── Property rows ───────────────────────────────────
        "prop.length" => if ru { "Длина" } else { "Length" },
        "prop.run" => if ru { "Горизонталь" } else { "Run" },
        "prop.rise" => if ru { "Превышение" } else { "Rise" },
        "prop.slope" => if ru { "Уклон" } else { "Slope" },
        "prop.start_point" => if ru { "Начальная точка" } else { "Start point" },
        "prop.end_point" => if ru { "Конечная точка" } else { "End point" },
        "prop.mid_point" => if ru { "Средняя точка" } else { "Mid point" },
        "prop.center" => if ru { "Вершина" } else { "Center" },
        "prop.area" => if ru { "Площадь" } else { "Area" },
        "prop.area_xy" => if ru { "Площадь (XY)" } else { "Area (XY)" },
        "prop.perimeter" => if ru { "Периметр" } else { "Perimeter" },
        "prop.points" => if ru { "Точек" } else { "Points" },
        "prop.coordinates" => if ru { "Координаты" } else { "Coordinates" },
        "prop.latitude" => if ru { "Широта" } else { "Latitude" },
        "prop.longitude" => if ru { "Долгота" } else { "Longitude" },
        "prop.altitude" => if ru { "Высота" } else { "Altitude" },
        "prop.station" => if ru { "Пикет" } else { "Station" },
        "prop.offset" => if ru { "Смещение" } else { "Offset" },
        "prop.radius" => if ru { "Радиус" } else { "Radius" },
        "prop.diameter" => if ru { "Диаметр" } else { "Diameter" },
        "prop.arc_length" => if ru { "Длина дуги" } else { "Arc length" },
        "prop.circumference" => if ru { "Длина окружности" } else { "Circumference" },
        "prop.angle" => if ru { "Угол" } else { "Angle" },

        // ── Labels ──────────────────────────────────────────
        "label.radius" => "R",
        "label.incomplete" => "-",

        // ── User messages ───────────────────────────────────
        "msg.geolocation_failed" => {
            if ru {
                "Не удалось определить географические координаты"
            } else {
                "Could not compute the geographic location"
            }
        }
        "msg.records_skipped" => {
            if ru {
                "Пропущены повреждённые измерения"
            } else {
                "Skipped malformed measurements"
            }
        }
        "msg.formatter_pending" => {
            if ru {
                "Форматы единиц ещё не загружены"
            } else {
                "Unit formats are not available yet"
            }
        }
        "msg.polygon_invalid" => {
            if ru {
                "Многоугольник вырожден"
            } else {
                "The polygon is degenerate"
            }
        }

        // ── Fallback ────────────────────────────────────────
        _ => "???",
    }
}
