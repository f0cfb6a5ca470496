/*!

# Quick start

This example exports the recognized sheets of a small survey, edits one
answer in a spreadsheet, and imports the corrections back.

**The project file** `sdapscsv` reads the questionnaire and the recognized
sheets from a JSON project file:

```json
{
  "title": "Lecture evaluation",
  "questionnaire": [
    { "kind": "head", "id": [1], "title": "The lecture" },
    { "kind": "choice", "id": [1, 1], "title": "Which topics did you like?",
      "boxes": [ { "id": 1, "label": "Parsing" }, { "id": 2, "label": "Typing" } ] },
    { "kind": "text", "id": [1, 2], "title": "Comments", "boxes": [ { "id": 1 } ] },
    { "kind": "option", "id": [1, 3], "title": "Overall rating" }
  ],
  "sheets": [
    { "questionnaireId": "1001", "globalId": "1",
      "boxes": { "1_1_1": { "state": 1, "quality": 0.92 },
                 "1_2_1": { "state": 1, "text": "More examples please" } },
      "answers": { "1_3": 2 } }
  ]
}
```

**Exporting** Run:

```bash
sdapscsv export --project lecture.json --quality --out lecture.csv
```

This writes:

```text
questionnaire_id,global_id,1_1_1,1_1_1_quality,1_1_2,1_1_2_quality,1_2_1,1_3
1001,1,1,0.92,0,0,More examples please,2
```

**Importing corrections** Open `lecture.csv` in any spreadsheet program,
fix the values that were misread and save it (CSV or Excel). Columns that
you delete are left untouched. Then run:

```bash
sdapscsv import --project lecture.json --input lecture.csv --out lecture.json
```

The updated sheets are written back into the project file. Run with
`--verbose` to see which rows were applied and which were skipped.

*/
