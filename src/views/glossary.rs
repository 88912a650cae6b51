/// (term, definition) pairs shown on the glossary tab.
pub const GLOSSARY: [(&str, &str); 4] = [
    (
        "Land traffic accidents",
        "Accidents in urban and suburban areas. Road events on federal-jurisdiction \
         highways are not included.",
    ),
    (
        "Fatal",
        "A traffic accident in which one or more people die at the scene.",
    ),
    (
        "Non-fatal",
        "A traffic accident in which one or more people are injured, regardless of \
         the severity of their injuries.",
    ),
    (
        "Damage only",
        "An accident causing material damage to motor vehicles, state property, \
         private buildings or other property.",
    ),
];
